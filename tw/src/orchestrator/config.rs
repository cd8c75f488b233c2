//! Orchestrator configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::DEFAULT_CHANNEL_CAPACITY;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Bound on each individual provider call
    #[serde(rename = "call-timeout-ms", default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Bound on a whole collection task (all of its provider calls)
    #[serde(rename = "task-timeout-ms", default = "default_task_timeout_ms")]
    pub task_timeout_ms: u64,

    /// Progress event channel capacity
    #[serde(rename = "event-capacity", default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_call_timeout_ms() -> u64 {
    5_000
}

fn default_task_timeout_ms() -> u64 {
    15_000
}

fn default_event_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
            task_timeout_ms: default_task_timeout_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl OrchestratorConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_millis(self.task_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.call_timeout(), Duration::from_secs(5));
        assert_eq!(config.task_timeout(), Duration::from_secs(15));
        assert_eq!(config.event_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: OrchestratorConfig = serde_yaml::from_str("call-timeout-ms: 250").unwrap();
        assert_eq!(config.call_timeout(), Duration::from_millis(250));
        assert_eq!(config.task_timeout_ms, 15_000);
    }
}
