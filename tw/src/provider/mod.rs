//! Provider interface
//!
//! Capability traits for the external data sources, the `Providers` registry
//! injected into the orchestrator, and a static knowledge-base implementation.

mod error;
mod knowledge;
mod registry;
mod static_provider;
mod traits;

pub use error::{Capability, ProviderError};
pub use knowledge::{ClimateEntry, Connection, FlightRoute, KnowledgeBase, RailRoute, RouteAdvice, RouteTable};
pub use registry::Providers;
pub use static_provider::{StaticProvider, derive_allocation};
pub use traits::{
    AttractionCatalog, BudgetPlanner, FlightSearch, LodgingQuery, LodgingSearch, TransitLookup, WeatherForecast,
};

#[cfg(test)]
pub use traits::mock;
