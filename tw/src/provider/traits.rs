//! Provider capability traits
//!
//! One trait per external capability. Implementations may be remote services
//! or static knowledge bases; the orchestrator only sees these contracts.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::ProviderError;
use crate::domain::{Attraction, BudgetBreakdown, Flight, Forecast, LodgingOption, TransitOption, TravelFramework};

#[async_trait]
pub trait FlightSearch: Send + Sync {
    async fn search_flights(&self, departure_city: &str, arrival_city: &str) -> Result<Vec<Flight>, ProviderError>;
}

/// Rail and local transport lookup
///
/// `origin == destination` asks for intra-city options.
#[async_trait]
pub trait TransitLookup: Send + Sync {
    async fn transit_options(&self, origin: &str, destination: &str) -> Result<Vec<TransitOption>, ProviderError>;
}

/// Lodging search parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LodgingQuery {
    pub city: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub budget_per_night: u32,
    pub keywords: Vec<String>,
}

#[async_trait]
pub trait LodgingSearch: Send + Sync {
    async fn search_lodging(&self, query: &LodgingQuery) -> Result<Vec<LodgingOption>, ProviderError>;
}

#[async_trait]
pub trait WeatherForecast: Send + Sync {
    async fn forecast(&self, location: &str, date: NaiveDate) -> Result<Forecast, ProviderError>;
}

#[async_trait]
pub trait BudgetPlanner: Send + Sync {
    async fn budget_breakdown(
        &self,
        framework: &TravelFramework,
        total_budget: u32,
    ) -> Result<BudgetBreakdown, ProviderError>;
}

/// Destination knowledge base: attractions per destination
#[async_trait]
pub trait AttractionCatalog: Send + Sync {
    async fn attractions(&self, destination: &str) -> Result<Vec<Attraction>, ProviderError>;
}
