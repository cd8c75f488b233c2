//! Integrator - cross-destination view over the filtered dataset
//!
//! Per-destination summaries, the static transport graph restricted to the
//! destinations present, weather/outdoor conflicts, and stay opportunities.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{BudgetBreakdown, Dataset, DestinationData, DestinationKey, Forecast};
use crate::provider::RouteTable;

/// Stay length recommended from the attraction count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StayRecommendation {
    #[serde(rename = "2–3 days")]
    Extended,
    #[serde(rename = "1–2 days")]
    Short,
    #[serde(rename = "1 day (or transit stop)")]
    TransitStop,
}

impl StayRecommendation {
    /// Four or more attractions: extended; two or three: short; else transit
    pub fn from_attraction_count(count: usize) -> Self {
        match count {
            c if c >= 4 => Self::Extended,
            c if c >= 2 => Self::Short,
            _ => Self::TransitStop,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extended => "2–3 days",
            Self::Short => "1–2 days",
            Self::TransitStop => "1 day (or transit stop)",
        }
    }

    /// Days used for feasibility estimates
    pub fn estimated_days(self) -> f64 {
        match self {
            Self::Extended => 2.5,
            Self::Short => 1.5,
            Self::TransitStop => 1.0,
        }
    }
}

impl std::fmt::Display for StayRecommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCounts {
    pub flights: usize,
    pub trains: usize,
    pub local: usize,
    pub lodging: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationSummary {
    pub destination: DestinationKey,
    pub option_counts: OptionCounts,
    pub attraction_count: usize,
    pub recommended_stay: StayRecommendation,
    pub weather: Option<Forecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEdge {
    pub from: DestinationKey,
    pub to: DestinationKey,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportGraph {
    pub edges: Vec<RouteEdge>,
}

impl TransportGraph {
    pub fn edge(&self, from: &str, to: &str) -> Option<&RouteEdge> {
        self.edges.iter().find(|e| e.from == from && e.to == to)
    }
}

/// A cross-category inconsistency; structured output, not a fault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub destination: DestinationKey,
    pub issue: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub destination: DestinationKey,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedView {
    /// One summary per destination, in dataset order
    pub summaries: Vec<DestinationSummary>,
    pub transport_graph: TransportGraph,
    pub conflicts: Vec<Conflict>,
    pub opportunities: Vec<Opportunity>,
    pub budget: Option<BudgetBreakdown>,
}

impl IntegratedView {
    pub fn summary(&self, destination: &str) -> Option<&DestinationSummary> {
        self.summaries.iter().find(|s| s.destination == destination)
    }
}

const WEATHER_MITIGATION: &str = "move outdoor visits to another day and keep indoor cultural sites as a backup";

pub struct Integrator {
    routes: RouteTable,
}

impl Integrator {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    pub fn integrate(&self, dataset: &Dataset) -> IntegratedView {
        debug!(destinations = dataset.len(), "Integrator::integrate: called");
        let summaries: Vec<_> = dataset.iter().map(summarize).collect();
        let conflicts = dataset.iter().filter_map(detect_conflict).collect();
        let opportunities = summaries
            .iter()
            .filter(|s| s.recommended_stay == StayRecommendation::Extended)
            .map(|s| Opportunity {
                destination: s.destination.clone(),
                description: format!(
                    "{} has {} attractions and can anchor an in-depth stay",
                    s.destination, s.attraction_count
                ),
            })
            .collect();

        IntegratedView {
            summaries,
            transport_graph: self.transport_graph(dataset),
            conflicts,
            opportunities,
            budget: dataset.budget.breakdown.clone(),
        }
    }

    /// Known connections whose endpoints are both in the dataset
    fn transport_graph(&self, dataset: &Dataset) -> TransportGraph {
        let edges = self
            .routes
            .connections
            .iter()
            .filter(|c| dataset.contains(&c.from))
            .flat_map(|c| {
                c.to.iter().filter(|to| dataset.contains(to)).map(|to| RouteEdge {
                    from: DestinationKey::new(c.from.as_str()),
                    to: DestinationKey::new(to.as_str()),
                    recommendation: self.routes.advice_for(&c.from, to).to_string(),
                })
            })
            .collect();
        TransportGraph { edges }
    }
}

fn summarize(data: &DestinationData) -> DestinationSummary {
    let transport = data.transportation();
    let attraction_count = data.attraction().map(|a| a.total_count).unwrap_or(0);
    DestinationSummary {
        destination: data.destination.clone(),
        option_counts: OptionCounts {
            flights: transport.map(|t| t.flights.len()).unwrap_or(0),
            trains: transport.map(|t| t.trains.len()).unwrap_or(0),
            local: transport.map(|t| t.local_options.len()).unwrap_or(0),
            lodging: data.accommodation().map(|a| a.ranked_options.len()).unwrap_or(0),
        },
        attraction_count,
        recommended_stay: StayRecommendation::from_attraction_count(attraction_count),
        weather: data.weather().and_then(|w| w.forecast.clone()),
    }
}

/// Adverse weather together with any outdoor attraction
fn detect_conflict(data: &DestinationData) -> Option<Conflict> {
    let forecast = data.weather()?.forecast.as_ref()?;
    if !forecast.condition.is_adverse() {
        return None;
    }
    let outdoor: Vec<&str> = data
        .attraction()?
        .attractions()
        .filter(|a| a.is_outdoor())
        .map(|a| a.name.as_str())
        .collect();
    if outdoor.is_empty() {
        return None;
    }

    debug!(destination = %data.destination, condition = %forecast.condition, "detect_conflict: conflict found");
    Some(Conflict {
        destination: data.destination.clone(),
        issue: format!(
            "{} forecast on {} conflicts with outdoor plans: {}",
            forecast.condition,
            forecast.date,
            outdoor.join(", ")
        ),
        mitigation: WEATHER_MITIGATION.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    use crate::domain::fixtures::dates;
    use crate::domain::{
        Attraction, AttractionRecord, BudgetEntry, Category, CategoryEntry, CategoryRecord, VisitLength,
        WeatherCondition, WeatherRecord,
    };
    use crate::provider::KnowledgeBase;

    fn attraction(name: &str, tags: &[&str]) -> Attraction {
        Attraction {
            name: name.to_string(),
            kind: "culture".to_string(),
            commercial_level: Default::default(),
            time_needed: VisitLength::HalfDay,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            note: None,
        }
    }

    fn dataset(destinations: &[(&str, WeatherCondition, Vec<Attraction>)]) -> Dataset {
        let order: Vec<DestinationKey> = destinations.iter().map(|(d, _, _)| DestinationKey::new(*d)).collect();
        let mut slots = HashMap::new();
        for (name, condition, attractions) in destinations {
            let key = DestinationKey::new(*name);
            let weather = CategoryRecord::Weather(WeatherRecord {
                forecast: Some(Forecast {
                    date: dates().check_in,
                    condition: *condition,
                    high_temp: 22,
                    low_temp: 12,
                    precipitation_probability: 80,
                }),
            });
            let mut groups = BTreeMap::new();
            groups.insert("culture".to_string(), attractions.clone());
            let attraction = CategoryRecord::Attraction(AttractionRecord {
                groups_by_type: groups,
                recommendations: Vec::new(),
                total_count: attractions.len(),
            });
            slots.insert((key.clone(), Category::Weather), CategoryEntry::collected(weather));
            slots.insert((key, Category::Attraction), CategoryEntry::collected(attraction));
        }
        Dataset::assemble(&order, slots, BudgetEntry::failed("not collected"))
    }

    fn integrator() -> Integrator {
        Integrator::new(KnowledgeBase::builtin().routes)
    }

    #[test]
    fn test_stay_boundaries() {
        assert_eq!(StayRecommendation::from_attraction_count(4), StayRecommendation::Extended);
        assert_eq!(StayRecommendation::from_attraction_count(3), StayRecommendation::Short);
        assert_eq!(StayRecommendation::from_attraction_count(2), StayRecommendation::Short);
        assert_eq!(StayRecommendation::from_attraction_count(1), StayRecommendation::TransitStop);
        assert_eq!(StayRecommendation::from_attraction_count(0), StayRecommendation::TransitStop);
        assert_eq!(StayRecommendation::Extended.to_string(), "2–3 days");
        assert_eq!(
            serde_json::to_string(&StayRecommendation::TransitStop).unwrap(),
            "\"1 day (or transit stop)\""
        );
    }

    #[test]
    fn test_heavy_rain_with_outdoor_conflicts_once() {
        let ds = dataset(&[(
            "Dali",
            WeatherCondition::HeavyRain,
            vec![attraction("Xizhou", &["outdoor"]), attraction("Erhai", &["outdoor", "lake"])],
        )]);
        let view = integrator().integrate(&ds);
        assert_eq!(view.conflicts.len(), 1);
        assert_eq!(view.conflicts[0].destination, "Dali");
        assert!(view.conflicts[0].issue.contains("heavy rain"));
    }

    #[test]
    fn test_clear_weather_has_no_conflict() {
        let ds = dataset(&[("Dali", WeatherCondition::Clear, vec![attraction("Xizhou", &["outdoor"])])]);
        assert!(integrator().integrate(&ds).conflicts.is_empty());
    }

    #[test]
    fn test_adverse_weather_without_outdoor_has_no_conflict() {
        let ds = dataset(&[("Dali", WeatherCondition::Storm, vec![attraction("Museum", &["indoor"])])]);
        assert!(integrator().integrate(&ds).conflicts.is_empty());
    }

    #[test]
    fn test_graph_only_links_present_destinations() {
        let ds = dataset(&[
            ("Dali", WeatherCondition::Clear, vec![]),
            ("Lijiang", WeatherCondition::Clear, vec![]),
        ]);
        let graph = integrator().integrate(&ds).transport_graph;
        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edge("Dali", "Lijiang").unwrap().recommendation.contains("1.5 hours"));
        assert_eq!(
            graph.edge("Lijiang", "Dali").unwrap().recommendation,
            RouteTable::FALLBACK_ADVICE
        );
        assert!(graph.edge("Dali", "Shaxi").is_none());
    }

    #[test]
    fn test_summary_and_opportunity() {
        let four: Vec<_> = (0..4).map(|i| attraction(&format!("Site {}", i), &[])).collect();
        let ds = dataset(&[
            ("Dali", WeatherCondition::Clear, four),
            ("Shaxi", WeatherCondition::Clear, vec![attraction("Old Town", &[])]),
        ]);
        let view = integrator().integrate(&ds);

        let dali = view.summary("Dali").unwrap();
        assert_eq!(dali.attraction_count, 4);
        assert_eq!(dali.recommended_stay, StayRecommendation::Extended);
        assert_eq!(dali.option_counts, OptionCounts::default());
        assert_eq!(view.summary("Shaxi").unwrap().recommended_stay, StayRecommendation::TransitStop);

        assert_eq!(view.opportunities.len(), 1);
        assert_eq!(view.opportunities[0].destination, "Dali");
        assert!(view.budget.is_none());
    }
}
