//! TripWeaver - multi-source itinerary data orchestration
//!
//! Given a travel framework (theme, destinations, duration, budget, dates) and
//! the traveller's deep needs, TripWeaver collects per-destination data from
//! several independent providers concurrently, joins it into one dataset,
//! and runs it through a fixed pipeline of pure stages.
//!
//! # Pipeline
//!
//! 1. **Collect**: one task per (destination, category) plus a budget task;
//!    a failing or slow provider degrades one entry, never the run
//! 2. **Assess**: completeness and critical gaps
//! 3. **Filter**: soft constraints narrow lodging options, never to nothing
//! 4. **Integrate**: summaries, transport graph, weather conflicts
//! 5. **Generate insights**: findings, recommendations, warnings, opportunities
//!
//! # Modules
//!
//! - [`domain`] - framework, needs, records and the joined dataset
//! - [`provider`] - capability traits, registry and the static knowledge base
//! - [`collector`] - per-category normalization
//! - [`orchestrator`] - concurrent fan-out/fan-in
//! - [`events`] - progress event bus and JSONL run logger
//! - [`quality`], [`filter`], [`integrator`], [`insight`] - pipeline stages
//! - [`coordinator`] - runs the stages in order
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod collector;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod events;
pub mod filter;
pub mod insight;
pub mod integrator;
pub mod orchestrator;
pub mod provider;
pub mod quality;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{CoordinationResult, PlanningCoordinator, PlanningRequest};
pub use domain::{
    Category, CategoryEntry, CategoryRecord, Constraint, ConstraintKind, Dataset, DeepNeeds, DeepPreference,
    DestinationKey, DestinationProfile, TravelFramework,
};
pub use error::PlanError;
pub use events::{CollectionEvent, EventBus, EventEmitter};
pub use filter::{ConstraintMismatch, FilteredDataset, filter};
pub use insight::{Insight, InsightKind, InsightSet};
pub use integrator::{IntegratedView, Integrator, StayRecommendation};
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use provider::{Capability, KnowledgeBase, ProviderError, Providers, StaticProvider};
pub use quality::{QualityIssue, QualityReport, assess};
