//! Providers - the injected capability registry

use std::sync::Arc;

use tracing::debug;

use super::error::{Capability, ProviderError};
use super::traits::{AttractionCatalog, BudgetPlanner, FlightSearch, LodgingSearch, TransitLookup, WeatherForecast};
use crate::error::PlanError;

/// One implementation per capability, shared by every collection task
#[derive(Clone, Default)]
pub struct Providers {
    flights: Option<Arc<dyn FlightSearch>>,
    transit: Option<Arc<dyn TransitLookup>>,
    lodging: Option<Arc<dyn LodgingSearch>>,
    weather: Option<Arc<dyn WeatherForecast>>,
    budget: Option<Arc<dyn BudgetPlanner>>,
    attractions: Option<Arc<dyn AttractionCatalog>>,
}

impl Providers {
    /// Create an empty registry (for composing or testing)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register one implementation for every capability
    pub fn from_all<P>(provider: Arc<P>) -> Self
    where
        P: FlightSearch + TransitLookup + LodgingSearch + WeatherForecast + BudgetPlanner + AttractionCatalog + 'static,
    {
        debug!("Providers::from_all: called");
        Self {
            flights: Some(provider.clone()),
            transit: Some(provider.clone()),
            lodging: Some(provider.clone()),
            weather: Some(provider.clone()),
            budget: Some(provider.clone()),
            attractions: Some(provider),
        }
    }

    pub fn with_flights(mut self, provider: Arc<dyn FlightSearch>) -> Self {
        self.flights = Some(provider);
        self
    }

    pub fn with_transit(mut self, provider: Arc<dyn TransitLookup>) -> Self {
        self.transit = Some(provider);
        self
    }

    pub fn with_lodging(mut self, provider: Arc<dyn LodgingSearch>) -> Self {
        self.lodging = Some(provider);
        self
    }

    pub fn with_weather(mut self, provider: Arc<dyn WeatherForecast>) -> Self {
        self.weather = Some(provider);
        self
    }

    pub fn with_budget(mut self, provider: Arc<dyn BudgetPlanner>) -> Self {
        self.budget = Some(provider);
        self
    }

    pub fn with_attractions(mut self, provider: Arc<dyn AttractionCatalog>) -> Self {
        self.attractions = Some(provider);
        self
    }

    /// Check if a capability is registered
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Flights => self.flights.is_some(),
            Capability::Transit => self.transit.is_some(),
            Capability::Lodging => self.lodging.is_some(),
            Capability::Weather => self.weather.is_some(),
            Capability::Budget => self.budget.is_some(),
            Capability::Attractions => self.attractions.is_some(),
        }
    }

    /// Capabilities not registered
    pub fn missing(&self) -> Vec<Capability> {
        Capability::ALL.into_iter().filter(|c| !self.has(*c)).collect()
    }

    /// Fail on the first missing capability
    pub fn validate(&self) -> Result<(), PlanError> {
        match self.missing().first() {
            Some(capability) => {
                debug!(%capability, "Providers::validate: capability missing");
                Err(PlanError::MissingCapability(*capability))
            }
            None => Ok(()),
        }
    }

    pub fn flights(&self) -> Result<&dyn FlightSearch, ProviderError> {
        self.flights.as_deref().ok_or_else(|| not_registered(Capability::Flights))
    }

    pub fn transit(&self) -> Result<&dyn TransitLookup, ProviderError> {
        self.transit.as_deref().ok_or_else(|| not_registered(Capability::Transit))
    }

    pub fn lodging(&self) -> Result<&dyn LodgingSearch, ProviderError> {
        self.lodging.as_deref().ok_or_else(|| not_registered(Capability::Lodging))
    }

    pub fn weather(&self) -> Result<&dyn WeatherForecast, ProviderError> {
        self.weather.as_deref().ok_or_else(|| not_registered(Capability::Weather))
    }

    pub fn budget(&self) -> Result<&dyn BudgetPlanner, ProviderError> {
        self.budget.as_deref().ok_or_else(|| not_registered(Capability::Budget))
    }

    pub fn attractions(&self) -> Result<&dyn AttractionCatalog, ProviderError> {
        self.attractions
            .as_deref()
            .ok_or_else(|| not_registered(Capability::Attractions))
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registered: Vec<_> = Capability::ALL.into_iter().filter(|c| self.has(*c)).collect();
        f.debug_struct("Providers").field("registered", &registered).finish()
    }
}

fn not_registered(capability: Capability) -> ProviderError {
    ProviderError::unavailable(capability, "capability not registered")
}
