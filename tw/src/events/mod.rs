//! Collection progress events
//!
//! The orchestrator emits one event per task outcome on an [`EventBus`]
//! (a `tokio::sync::broadcast` channel). Publishing never blocks and never
//! affects control flow; consumers (the CLI progress line, the JSONL run
//! logger) subscribe.

mod bus;
mod logger;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventEmitter, create_event_bus};
pub use logger::{EventLogger, default_runs_dir, read_run_events, spawn_event_logger};
pub use types::{CollectionEvent, EventLogEntry};
