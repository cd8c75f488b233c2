//! Orchestrator for concurrent collection
//!
//! Fans out one collection task per (destination, category) pair plus a
//! budget task and joins them into a [`crate::domain::Dataset`].

mod config;
mod core;

pub use config::OrchestratorConfig;
pub use self::core::Orchestrator;
