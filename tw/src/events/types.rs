//! Event types for collection progress
//!
//! One run emits `RunStarted`, a started/finished pair per collection task,
//! the budget outcome, then `RunCompleted`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, DestinationKey};

/// Core event enum - the vocabulary of collection activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CollectionEvent {
    /// Fan-out is about to start
    RunStarted {
        run_id: String,
        destinations: Vec<DestinationKey>,
        /// Collection tasks including the budget task
        task_count: usize,
    },
    TaskStarted {
        run_id: String,
        destination: DestinationKey,
        category: Category,
    },
    TaskCompleted {
        run_id: String,
        destination: DestinationKey,
        category: Category,
        elapsed_ms: u64,
    },
    /// The task resolved to an empty record with a failure marker
    TaskFailed {
        run_id: String,
        destination: DestinationKey,
        category: Category,
        reason: String,
        elapsed_ms: u64,
    },
    BudgetCollected {
        run_id: String,
        elapsed_ms: u64,
    },
    BudgetFailed {
        run_id: String,
        reason: String,
        elapsed_ms: u64,
    },
    /// Every task joined
    RunCompleted {
        run_id: String,
        completed: usize,
        failed: usize,
        elapsed_ms: u64,
    },
    /// The caller cancelled the run; no dataset was produced
    RunCancelled { run_id: String },
}

impl CollectionEvent {
    pub fn run_id(&self) -> &str {
        match self {
            Self::RunStarted { run_id, .. }
            | Self::TaskStarted { run_id, .. }
            | Self::TaskCompleted { run_id, .. }
            | Self::TaskFailed { run_id, .. }
            | Self::BudgetCollected { run_id, .. }
            | Self::BudgetFailed { run_id, .. }
            | Self::RunCompleted { run_id, .. }
            | Self::RunCancelled { run_id } => run_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "RunStarted",
            Self::TaskStarted { .. } => "TaskStarted",
            Self::TaskCompleted { .. } => "TaskCompleted",
            Self::TaskFailed { .. } => "TaskFailed",
            Self::BudgetCollected { .. } => "BudgetCollected",
            Self::BudgetFailed { .. } => "BudgetFailed",
            Self::RunCompleted { .. } => "RunCompleted",
            Self::RunCancelled { .. } => "RunCancelled",
        }
    }

    /// Whether this event ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RunCompleted { .. } | Self::RunCancelled { .. })
    }
}

/// Timestamped wrapper written to run logs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventLogEntry {
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    pub event: CollectionEvent,
}

impl EventLogEntry {
    pub fn new(event: CollectionEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_run_id_and_type() {
        let event = CollectionEvent::TaskFailed {
            run_id: "run-1".to_string(),
            destination: DestinationKey::new("Lijiang"),
            category: Category::Accommodation,
            reason: "lodging provider unavailable".to_string(),
            elapsed_ms: 12,
        };
        assert_eq!(event.run_id(), "run-1");
        assert_eq!(event.event_type(), "TaskFailed");
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_event_serialization() {
        let event = CollectionEvent::RunCompleted {
            run_id: "run-1".to_string(),
            completed: 11,
            failed: 1,
            elapsed_ms: 40,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"RunCompleted\""));

        let parsed: CollectionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
        assert!(parsed.is_terminal());
    }

    #[test]
    fn test_event_log_entry() {
        let entry = EventLogEntry::new(CollectionEvent::RunCancelled {
            run_id: "run-2".to_string(),
        });
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("ts"));
        assert!(json.contains("RunCancelled"));
    }
}
