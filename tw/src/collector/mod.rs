//! Collectors - one per category, plus the standalone budget collector
//!
//! A collector issues the provider calls for a single destination and
//! normalizes the responses into a [`CategoryRecord`]. Every provider call
//! goes through [`CollectContext::call`], which bounds it by the configured
//! timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Category, CategoryRecord, DestinationProfile, TravelFramework};
use crate::provider::{Capability, ProviderError, Providers};

mod accommodation;
mod attraction;
mod budget;
mod transport;
mod weather;

pub use accommodation::{AccommodationCollector, lodging_search_params, score_lodging};
pub use attraction::AttractionCollector;
pub use budget::collect_budget;
pub use transport::TransportCollector;
pub use weather::WeatherCollector;

/// Shared, read-only inputs for every collection task in a run
#[derive(Clone)]
pub struct CollectContext {
    pub framework: Arc<TravelFramework>,
    pub providers: Providers,
    pub call_timeout: Duration,
}

impl CollectContext {
    pub fn new(framework: Arc<TravelFramework>, providers: Providers, call_timeout: Duration) -> Self {
        Self {
            framework,
            providers,
            call_timeout,
        }
    }

    /// Run one provider call under the per-call timeout
    ///
    /// A call that outlives the timeout resolves to [`ProviderError::Timeout`].
    pub async fn call<T, F>(&self, capability: Capability, call: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                debug!(%capability, timeout_ms = self.call_timeout.as_millis() as u64, "CollectContext::call: timed out");
                Err(ProviderError::Timeout {
                    capability,
                    after: self.call_timeout,
                })
            }
        }
    }
}

/// Collects one category for one destination
#[async_trait]
pub trait Collector: Send + Sync {
    fn category(&self) -> Category;

    async fn collect(
        &self,
        destination: &DestinationProfile,
        ctx: &CollectContext,
    ) -> Result<CategoryRecord, ProviderError>;
}

/// The collector responsible for `category`
pub fn collector_for(category: Category) -> Arc<dyn Collector> {
    match category {
        Category::Transportation => Arc::new(TransportCollector),
        Category::Accommodation => Arc::new(AccommodationCollector),
        Category::Attraction => Arc::new(AttractionCollector),
        Category::Weather => Arc::new(WeatherCollector),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::domain::fixtures::framework;
    use crate::provider::{KnowledgeBase, StaticProvider};

    pub fn context(destinations: &[&str]) -> CollectContext {
        context_with(framework(destinations))
    }

    pub fn context_with(framework: TravelFramework) -> CollectContext {
        CollectContext::new(
            Arc::new(framework),
            Providers::from_all(Arc::new(StaticProvider::new(KnowledgeBase::builtin()))),
            Duration::from_secs(5),
        )
    }
}
