//! StaticProvider - every capability answered from a [`KnowledgeBase`]

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use super::error::{Capability, ProviderError};
use super::knowledge::{KnowledgeBase, RouteTable};
use super::traits::{
    AttractionCatalog, BudgetPlanner, FlightSearch, LodgingQuery, LodgingSearch, TransitLookup, WeatherForecast,
};
use crate::domain::{
    Attraction, BudgetBreakdown, BudgetLine, CommercialLevel, Flight, Forecast, LodgingOption, PrimaryTheme,
    TransitOption, TravelFramework,
};

/// Options priced above this multiple of the nightly budget are not returned
const LODGING_PRICE_CEILING: u32 = 3;

pub struct StaticProvider {
    kb: KnowledgeBase,
}

impl StaticProvider {
    pub fn new(kb: KnowledgeBase) -> Self {
        debug!("StaticProvider::new: called");
        Self { kb }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn routes(&self) -> &RouteTable {
        &self.kb.routes
    }
}

#[async_trait]
impl FlightSearch for StaticProvider {
    async fn search_flights(&self, departure_city: &str, arrival_city: &str) -> Result<Vec<Flight>, ProviderError> {
        debug!(%departure_city, %arrival_city, "StaticProvider::search_flights: called");
        Ok(self
            .kb
            .flights
            .iter()
            .find(|r| r.from == departure_city && r.to == arrival_city)
            .map(|r| r.flights.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl TransitLookup for StaticProvider {
    async fn transit_options(&self, origin: &str, destination: &str) -> Result<Vec<TransitOption>, ProviderError> {
        debug!(%origin, %destination, "StaticProvider::transit_options: called");
        if origin == destination {
            return Ok(self.kb.local_transport.get(origin).cloned().unwrap_or_default());
        }
        Ok(self
            .kb
            .rail
            .iter()
            .find(|r| r.from == origin && r.to == destination)
            .map(|r| r.options.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl LodgingSearch for StaticProvider {
    /// Options within the price ceiling, keyword matches first
    async fn search_lodging(&self, query: &LodgingQuery) -> Result<Vec<LodgingOption>, ProviderError> {
        debug!(city = %query.city, budget = query.budget_per_night, "StaticProvider::search_lodging: called");
        let ceiling = query.budget_per_night.saturating_mul(LODGING_PRICE_CEILING);
        let candidates = self.kb.lodging.get(&query.city).cloned().unwrap_or_default();

        let (mut matching, rest): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .filter(|o| query.budget_per_night == 0 || o.price_per_night <= ceiling)
            .partition(|o| {
                o.features.iter().any(|f| {
                    let f = f.to_lowercase();
                    query.keywords.iter().any(|k| f.contains(&k.to_lowercase()))
                })
            });
        matching.extend(rest);
        Ok(matching)
    }
}

#[async_trait]
impl WeatherForecast for StaticProvider {
    async fn forecast(&self, location: &str, date: NaiveDate) -> Result<Forecast, ProviderError> {
        debug!(%location, %date, "StaticProvider::forecast: called");
        let entry = self.kb.weather.get(location).ok_or_else(|| ProviderError::UnknownLocation {
            capability: Capability::Weather,
            location: location.to_string(),
        })?;
        Ok(Forecast {
            date,
            condition: entry.condition,
            high_temp: entry.high_temp,
            low_temp: entry.low_temp,
            precipitation_probability: entry.precipitation_probability,
        })
    }
}

#[async_trait]
impl BudgetPlanner for StaticProvider {
    async fn budget_breakdown(
        &self,
        framework: &TravelFramework,
        total_budget: u32,
    ) -> Result<BudgetBreakdown, ProviderError> {
        debug!(total_budget, "StaticProvider::budget_breakdown: called");
        if !framework.budget_allocation.is_empty() {
            debug!("StaticProvider::budget_breakdown: using framework allocation");
            return Ok(BudgetBreakdown {
                lines: framework.budget_allocation.clone(),
            });
        }
        Ok(derive_allocation(framework, total_budget))
    }
}

#[async_trait]
impl AttractionCatalog for StaticProvider {
    async fn attractions(&self, destination: &str) -> Result<Vec<Attraction>, ProviderError> {
        debug!(%destination, "StaticProvider::attractions: called");
        Ok(self.kb.attractions.get(destination).cloned().unwrap_or_default())
    }
}

/// Base split adjusted by theme and destination commercial levels, normalized
pub fn derive_allocation(framework: &TravelFramework, total_budget: u32) -> BudgetBreakdown {
    let mut ratios: Vec<(&str, f64)> = vec![
        ("transportation", 0.35),
        ("accommodation", 0.25),
        ("experiences", 0.20),
        ("food", 0.15),
        ("contingency", 0.05),
    ];
    let mut adjust = |category: &str, delta: f64| {
        if let Some(entry) = ratios.iter_mut().find(|(c, _)| *c == category) {
            entry.1 += delta;
        }
    };

    match framework.theme.primary_theme {
        PrimaryTheme::CulturalImmersion => {
            adjust("experiences", 0.05);
            adjust("accommodation", -0.05);
        }
        PrimaryTheme::NatureExploration => {
            adjust("transportation", 0.05);
            adjust("food", 0.05);
        }
        PrimaryTheme::Leisure | PrimaryTheme::ClassicSightseeing => {}
    }

    let levels: Vec<_> = framework.destinations.iter().map(|d| d.commercial_level).collect();
    if levels.contains(&CommercialLevel::High) {
        adjust("accommodation", 0.03);
        adjust("experiences", 0.02);
    }
    if levels.contains(&CommercialLevel::Low) {
        adjust("contingency", 0.02);
    }

    let total: f64 = ratios.iter().map(|(_, r)| r).sum();
    let lines = ratios
        .into_iter()
        .map(|(category, ratio)| {
            let ratio = ratio / total;
            BudgetLine {
                category: category.to_string(),
                amount: (f64::from(total_budget) * ratio) as u32,
                ratio,
                rationale: Some(allocation_rationale(category, framework.theme.primary_theme).to_string()),
            }
        })
        .collect();

    BudgetBreakdown { lines }
}

fn allocation_rationale(category: &str, theme: PrimaryTheme) -> &'static str {
    match (category, theme) {
        ("transportation", PrimaryTheme::CulturalImmersion) => "sites are spread out; transfers cost more",
        ("transportation", PrimaryTheme::NatureExploration) => "remote scenic areas raise transport costs",
        ("transportation", _) => "flights and local transport are the main expense",
        ("accommodation", PrimaryTheme::Leisure) => "lodging is the focus; budget raised",
        ("accommodation", _) => "nightly lodging is the baseline expense",
        ("experiences", PrimaryTheme::CulturalImmersion) => "cultural experiences are the core value",
        ("experiences", PrimaryTheme::NatureExploration) => "tickets and guides",
        ("experiences", _) => "tickets and activities",
        _ => "standard allocation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::framework;
    use crate::domain::{CommercialLevel, WeatherCondition};

    fn provider() -> StaticProvider {
        StaticProvider::new(KnowledgeBase::builtin())
    }

    #[tokio::test]
    async fn test_transit_intra_city_vs_rail() {
        let p = provider();
        let local = p.transit_options("Dali", "Dali").await.unwrap();
        assert!(local.iter().any(|o| o.mode == crate::domain::TransitMode::Charter));

        let rail = p.transit_options("Kunming", "Dali").await.unwrap();
        assert_eq!(rail.len(), 2);

        assert!(p.transit_options("Kunming", "Shaxi").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lodging_keyword_matches_first_and_ceiling() {
        let p = provider();
        let query = LodgingQuery {
            city: "Dali".to_string(),
            check_in: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(),
            budget_per_night: 270,
            keywords: vec!["heritage".to_string()],
        };
        let options = p.search_lodging(&query).await.unwrap();
        assert_eq!(options[0].name, "Dali Courtyard Inn");
        assert!(options.iter().all(|o| o.price_per_night <= 810));
        assert!(!options.iter().any(|o| o.name == "Erhai Lakeview Resort"));
    }

    #[tokio::test]
    async fn test_forecast_unknown_location() {
        let p = provider();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(p.forecast("Lijiang", date).await.unwrap().condition, WeatherCondition::Clear);
        let err = p.forecast("Atlantis", date).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownLocation { .. }));
    }

    #[test]
    fn test_derived_allocation_is_normalized() {
        let mut fw = framework(&["Dali", "Shaxi"]);
        fw.destinations[1].commercial_level = CommercialLevel::Low;
        let breakdown = derive_allocation(&fw, 8000);

        let ratio_sum: f64 = breakdown.lines.iter().map(|l| l.ratio).sum();
        assert!((ratio_sum - 1.0).abs() < 1e-9);
        assert!(breakdown.total_amount() <= 8000);

        let experiences = breakdown.line("experiences").unwrap();
        let accommodation = breakdown.line("accommodation").unwrap();
        assert!(experiences.ratio > accommodation.ratio);
    }

    #[tokio::test]
    async fn test_budget_prefers_framework_allocation() {
        let mut fw = framework(&["Dali"]);
        fw.budget_allocation = vec![BudgetLine {
            category: "transportation".to_string(),
            amount: 4000,
            ratio: 0.5,
            rationale: None,
        }];
        let breakdown = provider().budget_breakdown(&fw, 8000).await.unwrap();
        assert_eq!(breakdown.lines.len(), 1);
        assert_eq!(breakdown.lines[0].amount, 4000);
    }
}
