//! Destination knowledge base
//!
//! Static lookup tables (schedules, lodging, attractions, weather, route
//! advice) behind the provider traits. Loaded from YAML or built in.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{
    Attraction, CommercialLevel, Flight, LodgingOption, TransitMode, TransitOption, VisitLength, WeatherCondition,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRoute {
    pub from: String,
    pub to: String,
    pub flights: Vec<Flight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RailRoute {
    pub from: String,
    pub to: String,
    pub options: Vec<TransitOption>,
}

/// Typical conditions for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateEntry {
    pub condition: WeatherCondition,
    pub high_temp: i32,
    pub low_temp: i32,
    pub precipitation_probability: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAdvice {
    pub from: String,
    pub to: String,
    pub recommendation: String,
}

/// Static adjacency between known destinations with per-edge advice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTable {
    pub connections: Vec<Connection>,
    pub advice: Vec<RouteAdvice>,
}

impl RouteTable {
    pub const FALLBACK_ADVICE: &'static str = "consult live schedules for this route";

    /// Advice for a directed (from, to) pair, falling back to the generic hint
    pub fn advice_for(&self, from: &str, to: &str) -> &str {
        self.advice
            .iter()
            .find(|a| a.from == from && a.to == to)
            .map(|a| a.recommendation.as_str())
            .unwrap_or(Self::FALLBACK_ADVICE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBase {
    pub flights: Vec<FlightRoute>,
    pub rail: Vec<RailRoute>,
    pub local_transport: BTreeMap<String, Vec<TransitOption>>,
    pub lodging: BTreeMap<String, Vec<LodgingOption>>,
    pub attractions: BTreeMap<String, Vec<Attraction>>,
    pub weather: BTreeMap<String, ClimateEntry>,
    pub routes: RouteTable,
}

impl KnowledgeBase {
    /// Load a knowledge base from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "KnowledgeBase::load: called");
        let content = fs::read_to_string(&path).context("Failed to read knowledge base file")?;
        let kb: Self = serde_yaml::from_str(&content).context("Failed to parse knowledge base file")?;
        info!(
            "Loaded knowledge base from {}: {} lodging cities, {} attraction destinations",
            path.as_ref().display(),
            kb.lodging.len(),
            kb.attractions.len()
        );
        Ok(kb)
    }

    /// Load from `path` when given, otherwise use the built-in data set
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                debug!("KnowledgeBase::load_or_builtin: using builtin");
                Ok(Self::builtin())
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize knowledge base")
    }

    /// Built-in Yunnan data set (Kunming hub; Dali, Shaxi, Lijiang, Lugu Lake)
    pub fn builtin() -> Self {
        let flights = vec![FlightRoute {
            from: "Beijing".to_string(),
            to: "Kunming".to_string(),
            flights: vec![
                flight("Air China", "CA1234", "08:00", "11:30", 1200),
                flight("China Eastern", "MU5678", "14:00", "17:45", 1050),
            ],
        }];

        let rail = vec![
            RailRoute {
                from: "Kunming".to_string(),
                to: "Dali".to_string(),
                options: vec![
                    train("D8672", "08:00-10:30", 2.5, 145),
                    train("D8676", "14:00-16:35", 2.5, 145),
                ],
            },
            RailRoute {
                from: "Dali".to_string(),
                to: "Lijiang".to_string(),
                options: vec![train("D8137", "09:00-10:30", 1.5, 52)],
            },
            RailRoute {
                from: "Kunming".to_string(),
                to: "Lijiang".to_string(),
                options: vec![train("D8781", "07:50-11:15", 3.5, 202)],
            },
        ];

        let mut local_transport = BTreeMap::new();
        local_transport.insert(
            "Dali".to_string(),
            vec![
                local(TransitMode::Charter, "day tour around the old town, 300-500 per day"),
                local(TransitMode::Bicycle, "e-bike along Erhai Lake, 50-80 per day"),
                local(TransitMode::Taxi, "in-town rides, flag fall 8"),
            ],
        );
        local_transport.insert(
            "Shaxi".to_string(),
            vec![
                local(TransitMode::Walking, "the old town is walkable"),
                local(TransitMode::Carriage, "local horse carriage, 20-50 per ride"),
            ],
        );
        local_transport.insert(
            "Lijiang".to_string(),
            vec![
                local(TransitMode::Taxi, "in-town rides, flag fall 8"),
                local(TransitMode::Bus, "scenic-area shuttle buses"),
            ],
        );

        let mut lodging = BTreeMap::new();
        lodging.insert(
            "Dali".to_string(),
            vec![
                lodging_option(
                    "Dali Old Town Guesthouse",
                    280,
                    4.5,
                    &["old-town", "bai-style", "mountain-view", "quiet", "culture"],
                ),
                lodging_option("Erhai Lakeview Resort", 880, 4.8, &["luxury", "lake-view", "resort", "spa"]),
                lodging_option("Dali Courtyard Inn", 220, 4.3, &["courtyard", "heritage", "quiet"]),
            ],
        );
        lodging.insert(
            "Shaxi".to_string(),
            vec![lodging_option(
                "Shaxi Caravan Lodge",
                260,
                4.6,
                &["heritage", "guesthouse", "quiet", "culture"],
            )],
        );
        lodging.insert(
            "Lijiang".to_string(),
            vec![
                lodging_option(
                    "Shuhe Courtyard Inn",
                    350,
                    4.7,
                    &["quiet", "courtyard", "culture", "heritage"],
                ),
                lodging_option(
                    "Lijiang Grand Palace Hotel",
                    1200,
                    4.6,
                    &["luxury", "high-commercial", "resort"],
                ),
            ],
        );
        lodging.insert(
            "Lugu Lake".to_string(),
            vec![lodging_option(
                "Lugu Lakeside Homestay",
                300,
                4.4,
                &["lake-view", "guesthouse", "quiet"],
            )],
        );

        let mut attractions = BTreeMap::new();
        attractions.insert(
            "Dali".to_string(),
            vec![
                attraction(
                    "Dali Old Town",
                    "culture",
                    CommercialLevel::Medium,
                    VisitLength::HalfDay,
                    &["heritage", "iconic"],
                ),
                attraction(
                    "Erhai Lake",
                    "nature",
                    CommercialLevel::Low,
                    VisitLength::FullDay,
                    &["outdoor", "lake", "iconic", "leisure"],
                ),
                attraction(
                    "Three Pagodas of Chongsheng Temple",
                    "culture",
                    CommercialLevel::Medium,
                    VisitLength::Hours { min: 2, max: 3 },
                    &["heritage", "iconic"],
                ),
                attraction(
                    "Xizhou Ancient Town",
                    "culture",
                    CommercialLevel::Low,
                    VisitLength::HalfDay,
                    &["heritage", "village", "outdoor", "experience"],
                ),
            ],
        );
        attractions.insert(
            "Shaxi".to_string(),
            vec![
                attraction(
                    "Shaxi Old Town",
                    "culture",
                    CommercialLevel::Low,
                    VisitLength::FullDay,
                    &["heritage", "iconic", "experience"],
                ),
                attraction(
                    "Shibao Mountain",
                    "nature",
                    CommercialLevel::Low,
                    VisitLength::HalfDay,
                    &["outdoor", "hiking"],
                ),
                attraction(
                    "Tea Horse Road",
                    "culture",
                    CommercialLevel::Low,
                    VisitLength::Hours { min: 2, max: 3 },
                    &["heritage", "outdoor", "iconic"],
                ),
            ],
        );
        attractions.insert(
            "Lijiang".to_string(),
            vec![
                attraction(
                    "Lijiang Old Town",
                    "culture",
                    CommercialLevel::High,
                    VisitLength::FullDay,
                    &["heritage", "iconic"],
                ),
                attraction(
                    "Jade Dragon Snow Mountain",
                    "nature",
                    CommercialLevel::High,
                    VisitLength::FullDay,
                    &["outdoor", "iconic"],
                ),
                attraction(
                    "Shuhe Ancient Town",
                    "culture",
                    CommercialLevel::Medium,
                    VisitLength::HalfDay,
                    &["heritage", "leisure"],
                ),
            ],
        );
        attractions.insert(
            "Lugu Lake".to_string(),
            vec![
                attraction(
                    "Lugu Lake",
                    "nature",
                    CommercialLevel::Low,
                    VisitLength::FullDay,
                    &["outdoor", "lake", "iconic", "leisure"],
                ),
                attraction(
                    "Mosuo Village",
                    "culture",
                    CommercialLevel::Low,
                    VisitLength::HalfDay,
                    &["folk", "experience"],
                ),
            ],
        );

        let mut weather = BTreeMap::new();
        weather.insert("Kunming".to_string(), climate(WeatherCondition::Clear, 25, 15, 10));
        weather.insert("Dali".to_string(), climate(WeatherCondition::Cloudy, 24, 14, 30));
        weather.insert("Shaxi".to_string(), climate(WeatherCondition::LightRain, 22, 12, 55));
        weather.insert("Lijiang".to_string(), climate(WeatherCondition::Clear, 21, 9, 10));
        weather.insert("Lugu Lake".to_string(), climate(WeatherCondition::Overcast, 19, 8, 40));

        let routes = RouteTable {
            connections: vec![
                connection("Kunming", &["Dali"]),
                connection("Dali", &["Kunming", "Lijiang", "Shaxi"]),
                connection("Shaxi", &["Dali", "Lijiang"]),
                connection("Lijiang", &["Dali", "Shaxi"]),
            ],
            advice: vec![
                advice("Kunming", "Dali", "high-speed rail, about 2.5 hours, frequent departures"),
                advice("Dali", "Lijiang", "high-speed rail (about 1.5 hours) or coach"),
                advice("Dali", "Shaxi", "charter or shared car, 2-3 hours on mountain roads"),
            ],
        };

        Self {
            flights,
            rail,
            local_transport,
            lodging,
            attractions,
            weather,
            routes,
        }
    }
}

fn flight(carrier: &str, flight_no: &str, depart: &str, arrive: &str, price: u32) -> Flight {
    Flight {
        carrier: carrier.to_string(),
        flight_no: flight_no.to_string(),
        depart_time: depart.to_string(),
        arrive_time: arrive.to_string(),
        price,
    }
}

fn train(service: &str, schedule: &str, hours: f64, price: u32) -> TransitOption {
    TransitOption {
        mode: TransitMode::Rail,
        service: Some(service.to_string()),
        schedule: schedule.to_string(),
        duration_hours: Some(hours),
        price: Some(price),
    }
}

fn local(mode: TransitMode, description: &str) -> TransitOption {
    TransitOption {
        mode,
        service: None,
        schedule: description.to_string(),
        duration_hours: None,
        price: None,
    }
}

fn lodging_option(name: &str, price: u32, rating: f64, features: &[&str]) -> LodgingOption {
    LodgingOption {
        name: name.to_string(),
        price_per_night: price,
        rating,
        features: features.iter().map(|f| f.to_string()).collect(),
    }
}

fn attraction(name: &str, kind: &str, level: CommercialLevel, time: VisitLength, tags: &[&str]) -> Attraction {
    Attraction {
        name: name.to_string(),
        kind: kind.to_string(),
        commercial_level: level,
        time_needed: time,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        note: None,
    }
}

fn climate(condition: WeatherCondition, high: i32, low: i32, precipitation: u8) -> ClimateEntry {
    ClimateEntry {
        condition,
        high_temp: high,
        low_temp: low,
        precipitation_probability: precipitation,
    }
}

fn connection(from: &str, to: &[&str]) -> Connection {
    Connection {
        from: from.to_string(),
        to: to.iter().map(|t| t.to_string()).collect(),
    }
}

fn advice(from: &str, to: &str, recommendation: &str) -> RouteAdvice {
    RouteAdvice {
        from: from.to_string(),
        to: to.to_string(),
        recommendation: recommendation.to_string(),
    }
}
