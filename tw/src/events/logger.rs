//! Event Logger - persists run events to JSONL files
//!
//! Subscribes to the [`EventBus`] and appends every event to
//! `<runs_dir>/<run-id>.jsonl`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use eyre::Context;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use super::bus::EventBus;
use super::types::{CollectionEvent, EventLogEntry};

pub struct EventLogger {
    runs_dir: PathBuf,
    writers: HashMap<String, BufWriter<File>>,
}

impl EventLogger {
    pub fn new(runs_dir: impl AsRef<Path>) -> Self {
        let runs_dir = runs_dir.as_ref().to_path_buf();
        debug!(?runs_dir, "EventLogger::new: creating logger");
        Self {
            runs_dir,
            writers: HashMap::new(),
        }
    }

    /// Logger under `<data_local_dir>/tripweaver/runs`
    pub fn with_default_path() -> eyre::Result<Self> {
        let runs_dir = default_runs_dir()?;
        fs::create_dir_all(&runs_dir).context("Failed to create runs directory")?;
        Ok(Self::new(runs_dir))
    }

    pub fn write_event(&mut self, event: &CollectionEvent) -> eyre::Result<()> {
        let run_id = event.run_id();
        debug!(%run_id, event_type = event.event_type(), "EventLogger::write_event");

        let writer = match self.writers.entry(run_id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                fs::create_dir_all(&self.runs_dir)?;
                let log_path = self.runs_dir.join(format!("{}.jsonl", run_id));
                debug!(?log_path, "EventLogger: creating new log file");
                let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
                entry.insert(BufWriter::new(file))
            }
        };

        let json = serde_json::to_string(&EventLogEntry::new(event.clone()))?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        Ok(())
    }

    pub fn close_run(&mut self, run_id: &str) {
        debug!(%run_id, "EventLogger::close_run");
        if let Some(mut writer) = self.writers.remove(run_id) {
            let _ = writer.flush();
        }
    }

    /// Consume events until every sender is gone
    pub async fn run(mut self, mut rx: broadcast::Receiver<CollectionEvent>) {
        debug!("EventLogger::run: starting event logger");
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = self.write_event(&event) {
                        error!(run_id = event.run_id(), error = %e, "EventLogger: failed to write event");
                    }
                    if event.is_terminal() {
                        self.close_run(event.run_id());
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "EventLogger: lagged behind, missed events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("EventLogger: channel closed, shutting down");
                    break;
                }
            }
        }

        for (run_id, mut writer) in self.writers.drain() {
            debug!(%run_id, "EventLogger: flushing writer on shutdown");
            let _ = writer.flush();
        }
    }
}

pub fn default_runs_dir() -> eyre::Result<PathBuf> {
    let data_dir = dirs::data_local_dir().ok_or_else(|| eyre::eyre!("Could not determine data directory"))?;
    Ok(data_dir.join("tripweaver").join("runs"))
}

/// Read back the events of one run
pub fn read_run_events(runs_dir: impl AsRef<Path>, run_id: &str) -> eyre::Result<Vec<EventLogEntry>> {
    let log_path = runs_dir.as_ref().join(format!("{}.jsonl", run_id));
    debug!(?log_path, "read_run_events: reading log file");

    if !log_path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&log_path)?;
    let mut entries = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        match serde_json::from_str::<EventLogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(line, error = %e, "read_run_events: failed to parse line"),
        }
    }
    Ok(entries)
}

/// Spawn a logger writing to `runs_dir`
pub fn spawn_event_logger(event_bus: Arc<EventBus>, runs_dir: PathBuf) -> tokio::task::JoinHandle<()> {
    let logger = EventLogger::new(runs_dir);
    // Subscribe before spawning so no event emitted after this call is missed
    let rx = event_bus.subscribe();
    tokio::spawn(logger.run(rx))
}
