//! Event Bus - pub/sub for collection progress
//!
//! Built on a tokio broadcast channel. The orchestrator emits through an
//! [`EventEmitter`] bound to the run id; loggers and the CLI subscribe.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use super::types::CollectionEvent;
use crate::domain::{Category, DestinationKey};

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1_024;

pub struct EventBus {
    tx: broadcast::Sender<CollectionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an event to all subscribers
    ///
    /// Fire-and-forget: with no subscribers the event is dropped; a full
    /// channel drops the oldest events.
    pub fn emit(&self, event: CollectionEvent) {
        debug!(event_type = event.event_type(), run_id = event.run_id(), "EventBus::emit");
        let _ = self.tx.send(event);
    }

    /// Receive every event emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Emitter bound to one run
    pub fn emitter_for(&self, run_id: impl Into<String>) -> EventEmitter {
        let run_id = run_id.into();
        debug!(%run_id, "EventBus::emitter_for: creating emitter");
        EventEmitter {
            tx: self.tx.clone(),
            run_id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Cheap-to-clone handle that stamps events with its run id
#[derive(Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<CollectionEvent>,
    run_id: String,
}

impl EventEmitter {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn emit(&self, event: CollectionEvent) {
        debug!(event_type = event.event_type(), "EventEmitter::emit");
        let _ = self.tx.send(event);
    }

    // === Convenience methods ===

    pub fn run_started(&self, destinations: Vec<DestinationKey>, task_count: usize) {
        self.emit(CollectionEvent::RunStarted {
            run_id: self.run_id.clone(),
            destinations,
            task_count,
        });
    }

    pub fn task_started(&self, destination: &DestinationKey, category: Category) {
        self.emit(CollectionEvent::TaskStarted {
            run_id: self.run_id.clone(),
            destination: destination.clone(),
            category,
        });
    }

    pub fn task_completed(&self, destination: &DestinationKey, category: Category, elapsed_ms: u64) {
        self.emit(CollectionEvent::TaskCompleted {
            run_id: self.run_id.clone(),
            destination: destination.clone(),
            category,
            elapsed_ms,
        });
    }

    pub fn task_failed(&self, destination: &DestinationKey, category: Category, reason: &str, elapsed_ms: u64) {
        self.emit(CollectionEvent::TaskFailed {
            run_id: self.run_id.clone(),
            destination: destination.clone(),
            category,
            reason: reason.to_string(),
            elapsed_ms,
        });
    }

    pub fn budget_collected(&self, elapsed_ms: u64) {
        self.emit(CollectionEvent::BudgetCollected {
            run_id: self.run_id.clone(),
            elapsed_ms,
        });
    }

    pub fn budget_failed(&self, reason: &str, elapsed_ms: u64) {
        self.emit(CollectionEvent::BudgetFailed {
            run_id: self.run_id.clone(),
            reason: reason.to_string(),
            elapsed_ms,
        });
    }

    pub fn run_completed(&self, completed: usize, failed: usize, elapsed_ms: u64) {
        self.emit(CollectionEvent::RunCompleted {
            run_id: self.run_id.clone(),
            completed,
            failed,
            elapsed_ms,
        });
    }

    pub fn run_cancelled(&self) {
        self.emit(CollectionEvent::RunCancelled {
            run_id: self.run_id.clone(),
        });
    }
}

/// Create an event bus wrapped in an Arc for shared ownership
pub fn create_event_bus(capacity: usize) -> Arc<EventBus> {
    Arc::new(EventBus::new(capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_event_bus_subscribe() {
        let bus = EventBus::new(16);
        assert_eq!(bus.subscriber_count(), 0);
        let _rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_fine() {
        let bus = EventBus::new(16);
        bus.emitter_for("run-0").run_cancelled();
    }

    #[tokio::test]
    async fn test_emitter_stamps_run_id() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let emitter = bus.emitter_for("run-7");
        let dali = DestinationKey::new("Dali");

        emitter.run_started(vec![dali.clone()], 5);
        emitter.task_started(&dali, Category::Weather);
        emitter.task_completed(&dali, Category::Weather, 3);
        emitter.task_failed(&dali, Category::Accommodation, "timeout", 50);
        emitter.budget_collected(1);
        emitter.run_completed(4, 1, 60);

        for _ in 0..6 {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.run_id(), "run-7");
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = create_event_bus(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emitter_for("run-1").budget_failed("unavailable", 2);

        assert_eq!(rx1.recv().await.unwrap().event_type(), "BudgetFailed");
        assert_eq!(rx2.recv().await.unwrap().event_type(), "BudgetFailed");
    }
}
