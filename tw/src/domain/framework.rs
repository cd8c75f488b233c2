//! Travel framework - the upstream plan skeleton this engine collects data for
//!
//! Produced by the framework designer (theme, destination set, duration,
//! budget, pacing). Consumed read-only.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::category::DestinationKey;
use super::dataset::BudgetLine;
use crate::error::PlanError;

/// Primary trip theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimaryTheme {
    CulturalImmersion,
    NatureExploration,
    Leisure,
    ClassicSightseeing,
}

impl std::fmt::Display for PrimaryTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CulturalImmersion => "cultural immersion",
            Self::NatureExploration => "nature exploration",
            Self::Leisure => "leisure",
            Self::ClassicSightseeing => "classic sightseeing",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub primary_theme: PrimaryTheme,
    #[serde(default)]
    pub secondary_themes: Vec<String>,
}

/// How commercialized a destination or attraction is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommercialLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Per-destination attributes chosen by the framework designer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationProfile {
    pub name: DestinationKey,
    #[serde(default)]
    pub commercial_level: CommercialLevel,
    #[serde(default)]
    pub themes: Vec<PrimaryTheme>,
    #[serde(default)]
    pub culture_focus: Vec<String>,
    #[serde(default)]
    pub nature_features: Vec<String>,
}

impl DestinationProfile {
    pub fn new(name: impl Into<DestinationKey>) -> Self {
        Self {
            name: name.into(),
            commercial_level: CommercialLevel::default(),
            themes: Vec::new(),
            culture_focus: Vec::new(),
            nature_features: Vec::new(),
        }
    }

    pub fn with_commercial_level(mut self, level: CommercialLevel) -> Self {
        self.commercial_level = level;
        self
    }
}

/// Trip pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingStrategy {
    pub description: String,
    pub nights_per_destination: u32,
    pub daily_activities: f64,
    pub free_time_ratio: f64,
}

impl Default for PacingStrategy {
    fn default() -> Self {
        Self {
            description: "balanced sightseeing pace".to_string(),
            nights_per_destination: 2,
            daily_activities: 3.0,
            free_time_ratio: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelDates {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

fn default_origin_city() -> String {
    "Beijing".to_string()
}

fn default_hub_city() -> String {
    "Kunming".to_string()
}

/// The travel framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelFramework {
    pub theme: Theme,

    /// Destinations in visiting order
    pub destinations: Vec<DestinationProfile>,

    pub duration_days: u32,

    pub total_budget: u32,

    /// Designer's budget split; empty lets the budget provider derive one
    #[serde(default)]
    pub budget_allocation: Vec<BudgetLine>,

    #[serde(default)]
    pub pacing_strategy: PacingStrategy,

    /// City the traveller departs from
    #[serde(default = "default_origin_city")]
    pub origin_city: String,

    /// Arrival hub that rail legs to each destination start from
    #[serde(default = "default_hub_city")]
    pub hub_city: String,

    pub travel_dates: TravelDates,
}

impl TravelFramework {
    /// Destination keys in visiting order
    pub fn destination_keys(&self) -> Vec<DestinationKey> {
        self.destinations.iter().map(|d| d.name.clone()).collect()
    }

    pub fn destination(&self, key: &DestinationKey) -> Option<&DestinationProfile> {
        self.destinations.iter().find(|d| &d.name == key)
    }

    /// Reject frameworks the orchestrator cannot plan for
    pub fn validate(&self) -> Result<(), PlanError> {
        debug!(destinations = self.destinations.len(), "TravelFramework::validate: called");
        if self.destinations.is_empty() {
            return Err(PlanError::NoDestinations);
        }

        let mut seen = HashSet::new();
        for destination in &self.destinations {
            if destination.name.as_str().trim().is_empty() {
                return Err(PlanError::InvalidFramework("destination name is empty".to_string()));
            }
            if !seen.insert(destination.name.clone()) {
                return Err(PlanError::DuplicateDestination(destination.name.clone()));
            }
        }

        if self.travel_dates.check_out < self.travel_dates.check_in {
            return Err(PlanError::InvalidFramework(format!(
                "check-out {} precedes check-in {}",
                self.travel_dates.check_out, self.travel_dates.check_in
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn dates() -> TravelDates {
        TravelDates {
            check_in: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(),
        }
    }

    pub fn framework(destinations: &[&str]) -> TravelFramework {
        TravelFramework {
            theme: Theme {
                primary_theme: PrimaryTheme::CulturalImmersion,
                secondary_themes: vec!["photography".to_string()],
            },
            destinations: destinations.iter().map(|d| DestinationProfile::new(*d)).collect(),
            duration_days: 7,
            total_budget: 8000,
            budget_allocation: Vec::new(),
            pacing_strategy: PacingStrategy::default(),
            origin_city: default_origin_city(),
            hub_city: default_hub_city(),
            travel_dates: dates(),
        }
    }
}
