//! Orchestrator - fan-out/fan-in over every (destination, category) pair
//!
//! One task per pair plus one budget task, all launched up front on a
//! `JoinSet`. The orchestrator is the single aggregating owner: it drains
//! task results one at a time into per-key slots, so placement depends on
//! the (destination, category) key and never on arrival order.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::OrchestratorConfig;
use crate::collector::{CollectContext, Collector, collect_budget, collector_for};
use crate::domain::{BudgetEntry, Category, CategoryEntry, Dataset, DestinationKey, DestinationProfile, TravelFramework};
use crate::error::PlanError;
use crate::events::{EventBus, EventEmitter};
use crate::provider::Providers;

/// What a collection task reports back to the join
enum TaskOutcome {
    Category {
        destination: DestinationKey,
        entry: CategoryEntry,
    },
    Budget(BudgetEntry),
}

pub struct Orchestrator {
    providers: Providers,
    config: OrchestratorConfig,
    event_bus: Arc<EventBus>,
}

impl Orchestrator {
    pub fn new(providers: Providers, config: OrchestratorConfig) -> Self {
        debug!(?providers, "Orchestrator::new: called");
        let event_bus = Arc::new(EventBus::new(config.event_capacity));
        Self {
            providers,
            config,
            event_bus,
        }
    }

    /// Publish progress on a shared bus instead of a private one
    pub fn with_events(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Collect the full dataset for `framework`
    ///
    /// Fails only on malformed input, before any task is launched. Every
    /// launched task is joined; task failures become failed entries.
    pub async fn collect(&self, framework: &TravelFramework) -> Result<Dataset, PlanError> {
        self.collect_until(framework, std::future::pending()).await
    }

    /// Like [`Orchestrator::collect`], abandoning the run when `cancel` resolves
    ///
    /// In-flight tasks are aborted and nothing collected so far is returned.
    pub async fn collect_until<C>(&self, framework: &TravelFramework, cancel: C) -> Result<Dataset, PlanError>
    where
        C: Future<Output = ()>,
    {
        debug!(destinations = framework.destinations.len(), "Orchestrator::collect_until: called");
        framework.validate()?;
        self.providers.validate()?;

        let run_id = Uuid::now_v7().to_string();
        let emitter = self.event_bus.emitter_for(run_id.as_str());
        let order = framework.destination_keys();
        let task_count = order.len() * Category::ALL.len() + 1;
        info!(%run_id, destinations = order.len(), task_count, "Starting collection run");
        emitter.run_started(order.clone(), task_count);

        let ctx = CollectContext::new(
            Arc::new(framework.clone()),
            self.providers.clone(),
            self.config.call_timeout(),
        );
        let started = Instant::now();
        let mut tasks = self.spawn_tasks(&ctx, &emitter);

        tokio::pin!(cancel);
        let joined = tokio::select! {
            biased;
            _ = &mut cancel => None,
            joined = join_all(&mut tasks) => Some(joined),
        };

        let Some((slots, budget)) = joined else {
            warn!(%run_id, in_flight = tasks.len(), "Collection run cancelled");
            tasks.abort_all();
            emitter.run_cancelled();
            return Err(PlanError::Cancelled);
        };

        let dataset = Dataset::assemble(&order, slots, budget);
        let failed = dataset
            .iter()
            .flat_map(|d| d.entries.values())
            .filter(|e| e.is_failed())
            .count()
            + usize::from(!dataset.budget.is_available());
        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(%run_id, completed = task_count - failed, failed, elapsed_ms, "Collection run joined");
        emitter.run_completed(task_count - failed, failed, elapsed_ms);

        Ok(dataset)
    }

    fn spawn_tasks(&self, ctx: &CollectContext, emitter: &EventEmitter) -> JoinSet<TaskOutcome> {
        let task_timeout = self.config.task_timeout();
        let mut tasks = JoinSet::new();

        for profile in &ctx.framework.destinations {
            for category in Category::ALL {
                tasks.spawn(run_category_task(
                    collector_for(category),
                    profile.clone(),
                    ctx.clone(),
                    emitter.clone(),
                    task_timeout,
                ));
            }
        }
        tasks.spawn(run_budget_task(ctx.clone(), emitter.clone(), task_timeout));

        debug!(spawned = tasks.len(), "Orchestrator::spawn_tasks: launched");
        tasks
    }
}

/// One (destination, category) task; always resolves to an entry
async fn run_category_task(
    collector: Arc<dyn Collector>,
    profile: DestinationProfile,
    ctx: CollectContext,
    emitter: EventEmitter,
    task_timeout: Duration,
) -> TaskOutcome {
    let category = collector.category();
    let destination = profile.name.clone();
    emitter.task_started(&destination, category);
    let started = Instant::now();

    let result = match tokio::time::timeout(task_timeout, collector.collect(&profile, &ctx)).await {
        Ok(Ok(record)) if record.category() == category => Ok(record),
        Ok(Ok(record)) => Err(format!("collector returned a {} record", record.category())),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("collection timed out after {}ms", task_timeout.as_millis())),
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let entry = match result {
        Ok(record) => {
            debug!(%destination, %category, elapsed_ms, "run_category_task: collected");
            emitter.task_completed(&destination, category, elapsed_ms);
            CategoryEntry::collected(record)
        }
        Err(reason) => {
            warn!(%destination, %category, %reason, "Collection task failed");
            emitter.task_failed(&destination, category, &reason, elapsed_ms);
            CategoryEntry::failed(category, reason)
        }
    };

    TaskOutcome::Category { destination, entry }
}

async fn run_budget_task(ctx: CollectContext, emitter: EventEmitter, task_timeout: Duration) -> TaskOutcome {
    let started = Instant::now();
    let result = match tokio::time::timeout(task_timeout, collect_budget(&ctx)).await {
        Ok(Ok(breakdown)) => Ok(breakdown),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("budget collection timed out after {}ms", task_timeout.as_millis())),
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(breakdown) => {
            debug!(lines = breakdown.lines.len(), elapsed_ms, "run_budget_task: collected");
            emitter.budget_collected(elapsed_ms);
            TaskOutcome::Budget(BudgetEntry::collected(breakdown))
        }
        Err(reason) => {
            warn!(%reason, "Budget collection failed");
            emitter.budget_failed(&reason, elapsed_ms);
            TaskOutcome::Budget(BudgetEntry::failed(reason))
        }
    }
}

/// Drain every task into its slot
async fn join_all(
    tasks: &mut JoinSet<TaskOutcome>,
) -> (HashMap<(DestinationKey, Category), CategoryEntry>, BudgetEntry) {
    let mut slots = HashMap::new();
    let mut budget = None;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(TaskOutcome::Category { destination, entry }) => {
                slots.insert((destination, entry.category()), entry);
            }
            Ok(TaskOutcome::Budget(entry)) => budget = Some(entry),
            // The slot stays empty and is filled as failed on assembly
            Err(e) => warn!(error = %e, "Collection task aborted"),
        }
    }

    (
        slots,
        budget.unwrap_or_else(|| BudgetEntry::failed("no result reported")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::framework;
    use crate::events::CollectionEvent;
    use crate::provider::Capability;
    use crate::provider::mock::MockProvider;

    fn orchestrator(mock: MockProvider) -> Orchestrator {
        Orchestrator::new(Providers::from_all(Arc::new(mock)), OrchestratorConfig::default())
    }

    #[tokio::test]
    async fn test_every_destination_gets_four_entries() {
        let fw = framework(&["Dali", "Shaxi", "Lijiang"]);
        let dataset = orchestrator(MockProvider::new()).collect(&fw).await.unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.keys().map(|k| k.as_str()).collect::<Vec<_>>(), vec!["Dali", "Shaxi", "Lijiang"]);
        for destination in dataset.iter() {
            assert_eq!(destination.entries.len(), 4);
            assert!(destination.entries.values().all(|e| !e.is_failed()));
        }
        assert!(dataset.budget.is_available());
    }

    #[tokio::test]
    async fn test_provider_failure_is_isolated() {
        let fw = framework(&["Dali", "Lijiang"]);
        let mock = MockProvider::new().fail_on(Capability::Lodging, "Lijiang");
        let dataset = orchestrator(mock).collect(&fw).await.unwrap();

        let lijiang = dataset.get("Lijiang").unwrap();
        let lodging = lijiang.entry(Category::Accommodation).unwrap();
        assert!(lodging.is_failed());
        assert!(lodging.record.is_empty());
        assert!(lijiang.entry(Category::Attraction).unwrap().is_complete());
        assert!(dataset.get("Dali").unwrap().entries.values().all(|e| !e.is_failed()));
    }

    #[tokio::test]
    async fn test_slow_call_times_out_without_blocking_join() {
        let fw = framework(&["Dali", "Shaxi"]);
        let mock = MockProvider::new().delay_on(Capability::Weather, "Shaxi", Duration::from_secs(30));
        let config = OrchestratorConfig {
            call_timeout_ms: 50,
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(Providers::from_all(Arc::new(mock)), config);

        let dataset = orchestrator.collect(&fw).await.unwrap();
        let weather = dataset.get("Shaxi").unwrap().entry(Category::Weather).unwrap();
        assert!(weather.failure.as_deref().unwrap().contains("timed out"));
        assert!(dataset.get("Dali").unwrap().entry(Category::Weather).unwrap().is_complete());
    }

    #[tokio::test]
    async fn test_budget_failure_keeps_destinations() {
        let fw = framework(&["Dali"]);
        let dataset = orchestrator(MockProvider::new().fail_on(Capability::Budget, "*"))
            .collect(&fw)
            .await
            .unwrap();
        assert!(!dataset.budget.is_available());
        assert!(dataset.get("Dali").unwrap().entries.values().all(|e| !e.is_failed()));
    }

    #[tokio::test]
    async fn test_missing_capability_fails_before_launch() {
        let mock = Arc::new(MockProvider::new());
        let providers = Providers::empty()
            .with_flights(mock.clone())
            .with_transit(mock.clone())
            .with_weather(mock.clone())
            .with_budget(mock.clone())
            .with_attractions(mock.clone());
        let orchestrator = Orchestrator::new(providers, OrchestratorConfig::default());

        let err = orchestrator.collect(&framework(&["Dali"])).await.unwrap_err();
        assert!(matches!(err, PlanError::MissingCapability(Capability::Lodging)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_destinations_fail_fast() {
        let err = orchestrator(MockProvider::new())
            .collect(&framework(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::NoDestinations));
    }

    #[tokio::test]
    async fn test_cancel_discards_partial_results() {
        let fw = framework(&["Dali"]);
        let mock = MockProvider::new().delay_on(Capability::Weather, "Dali", Duration::from_secs(30));
        let orchestrator = orchestrator(mock);
        let mut rx = orchestrator.event_bus().subscribe();

        let result = orchestrator
            .collect_until(&fw, tokio::time::sleep(Duration::from_millis(50)))
            .await;
        assert!(matches!(result, Err(PlanError::Cancelled)));

        let mut saw_cancel = false;
        while let Ok(event) = rx.try_recv() {
            saw_cancel |= matches!(event, CollectionEvent::RunCancelled { .. });
        }
        assert!(saw_cancel);
    }

    #[tokio::test]
    async fn test_events_cover_every_task() {
        let fw = framework(&["Dali", "Shaxi"]);
        let orchestrator = orchestrator(MockProvider::new().fail_on(Capability::Weather, "Shaxi"));
        let mut rx = orchestrator.event_bus().subscribe();
        orchestrator.collect(&fw).await.unwrap();

        let mut finished = 0;
        let mut failed = 0;
        let mut summary = None;
        while let Ok(event) = rx.try_recv() {
            match event {
                CollectionEvent::TaskCompleted { .. } | CollectionEvent::BudgetCollected { .. } => finished += 1,
                CollectionEvent::TaskFailed { .. } | CollectionEvent::BudgetFailed { .. } => failed += 1,
                CollectionEvent::RunCompleted { completed, failed, .. } => summary = Some((completed, failed)),
                _ => {}
            }
        }
        assert_eq!(finished + failed, 9);
        assert_eq!(failed, 1);
        assert_eq!(summary, Some((8, 1)));
    }
}
