//! Category records - the normalized payload each collector produces

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::framework::CommercialLevel;

// === Transportation ===

/// A single flight offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub carrier: String,
    pub flight_no: String,
    pub depart_time: String,
    pub arrive_time: String,
    pub price: u32,
}

/// Ground transport mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitMode {
    Rail,
    Bus,
    Charter,
    Taxi,
    Bicycle,
    Walking,
    Carriage,
}

impl std::fmt::Display for TransitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Rail => "rail",
            Self::Bus => "bus",
            Self::Charter => "charter",
            Self::Taxi => "taxi",
            Self::Bicycle => "bicycle",
            Self::Walking => "walking",
            Self::Carriage => "carriage",
        };
        f.write_str(s)
    }
}

/// A rail or local transport option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitOption {
    pub mode: TransitMode,
    /// Train number or operator, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Schedule ("08:00-10:30") or free-form description
    pub schedule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
}

/// Which leg of the journey a piece of transport advice covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportLeg {
    Flight,
    Rail,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportAdvice {
    pub leg: TransportLeg,
    pub recommendation: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportRecord {
    pub flights: Vec<Flight>,
    pub trains: Vec<TransitOption>,
    pub local_options: Vec<TransitOption>,
    pub recommendation: Vec<TransportAdvice>,
}

// === Accommodation ===

/// A lodging option as returned by a lodging search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LodgingOption {
    pub name: String,
    pub price_per_night: u32,
    pub rating: f64,
    #[serde(default)]
    pub features: Vec<String>,
}

impl LodgingOption {
    /// Case-insensitive exact feature tag test
    pub fn has_feature(&self, tag: &str) -> bool {
        self.features.iter().any(|f| f.eq_ignore_ascii_case(tag))
    }
}

/// A lodging option with its recommendation score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLodging {
    #[serde(flatten)]
    pub option: LodgingOption,
    pub score: f64,
}

/// Parameters the accommodation collector searched with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LodgingSearchParams {
    pub budget_per_night: u32,
    pub keywords: Vec<String>,
    pub culture_emphasis: bool,
    pub quiet_preferred: bool,
    pub budget_conscious: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccommodationRecord {
    pub ranked_options: Vec<RankedLodging>,
    pub search_params: LodgingSearchParams,
    pub strategy_note: String,
    /// Set by the constraint filter when it narrowed `ranked_options`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_note: Option<String>,
}

// === Attraction ===

/// How long a visit takes
///
/// Serialized as `full-day`, `half-day` or an hour range such as `2-3h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VisitLength {
    FullDay,
    HalfDay,
    Hours { min: u32, max: u32 },
}

impl VisitLength {
    /// Planning hours: the lower bound of a range
    pub fn hours(self) -> u32 {
        match self {
            Self::FullDay => 8,
            Self::HalfDay => 4,
            Self::Hours { min, .. } => min,
        }
    }
}

impl Default for VisitLength {
    fn default() -> Self {
        Self::Hours { min: 2, max: 2 }
    }
}

impl std::fmt::Display for VisitLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullDay => f.write_str("full-day"),
            Self::HalfDay => f.write_str("half-day"),
            Self::Hours { min, max } if min == max => write!(f, "{}h", min),
            Self::Hours { min, max } => write!(f, "{}-{}h", min, max),
        }
    }
}

impl std::str::FromStr for VisitLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "full-day" | "full day" => return Ok(Self::FullDay),
            "half-day" | "half day" => return Ok(Self::HalfDay),
            _ => {}
        }
        let range = s
            .trim_end_matches("hours")
            .trim_end_matches("hour")
            .trim_end_matches('h')
            .trim();
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("Invalid visit length: {}", s))
        };
        match range.split_once('-') {
            Some((min, max)) => Ok(Self::Hours {
                min: parse(min)?,
                max: parse(max)?,
            }),
            None => {
                let hours = parse(range)?;
                Ok(Self::Hours { min: hours, max: hours })
            }
        }
    }
}

impl TryFrom<String> for VisitLength {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VisitLength> for String {
    fn from(value: VisitLength) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    /// Attraction type used for grouping ("culture", "nature", ...)
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub commercial_level: CommercialLevel,
    #[serde(default)]
    pub time_needed: VisitLength,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Attraction {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_outdoor(&self) -> bool {
        self.has_tag("outdoor")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractionAdvice {
    pub focus: String,
    pub suggestions: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttractionRecord {
    pub groups_by_type: BTreeMap<String, Vec<Attraction>>,
    pub recommendations: Vec<AttractionAdvice>,
    pub total_count: usize,
}

impl AttractionRecord {
    pub fn attractions(&self) -> impl Iterator<Item = &Attraction> {
        self.groups_by_type.values().flatten()
    }

    pub fn has_outdoor(&self) -> bool {
        self.attractions().any(Attraction::is_outdoor)
    }
}

// === Weather ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    #[serde(rename = "clear")]
    Clear,
    #[serde(rename = "cloudy")]
    Cloudy,
    #[serde(rename = "overcast")]
    Overcast,
    #[serde(rename = "light rain")]
    LightRain,
    #[serde(rename = "moderate rain")]
    ModerateRain,
    #[serde(rename = "heavy rain")]
    HeavyRain,
    #[serde(rename = "storm")]
    Storm,
}

impl WeatherCondition {
    /// Conditions that rule out outdoor plans
    pub fn is_adverse(self) -> bool {
        matches!(self, Self::ModerateRain | Self::HeavyRain | Self::Storm)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Overcast => "overcast",
            Self::LightRain => "light rain",
            Self::ModerateRain => "moderate rain",
            Self::HeavyRain => "heavy rain",
            Self::Storm => "storm",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WeatherCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clear" | "sunny" => Ok(Self::Clear),
            "cloudy" => Ok(Self::Cloudy),
            "overcast" => Ok(Self::Overcast),
            "light rain" => Ok(Self::LightRain),
            "moderate rain" => Ok(Self::ModerateRain),
            "heavy rain" => Ok(Self::HeavyRain),
            "storm" => Ok(Self::Storm),
            _ => Err(format!("Unknown weather condition: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub date: NaiveDate,
    pub condition: WeatherCondition,
    pub high_temp: i32,
    pub low_temp: i32,
    pub precipitation_probability: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub forecast: Option<Forecast>,
}

// === Tagged record ===

/// Normalized payload for one (destination, category) slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum CategoryRecord {
    Transportation(TransportRecord),
    Accommodation(AccommodationRecord),
    Attraction(AttractionRecord),
    Weather(WeatherRecord),
}

impl CategoryRecord {
    /// The empty record substituted when collection fails
    pub fn empty(category: Category) -> Self {
        match category {
            Category::Transportation => Self::Transportation(TransportRecord::default()),
            Category::Accommodation => Self::Accommodation(AccommodationRecord::default()),
            Category::Attraction => Self::Attraction(AttractionRecord::default()),
            Category::Weather => Self::Weather(WeatherRecord::default()),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Transportation(_) => Category::Transportation,
            Self::Accommodation(_) => Category::Accommodation,
            Self::Attraction(_) => Category::Attraction,
            Self::Weather(_) => Category::Weather,
        }
    }

    /// True when the record carries no usable data
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Transportation(t) => t.flights.is_empty() && t.trains.is_empty() && t.local_options.is_empty(),
            Self::Accommodation(a) => a.ranked_options.is_empty(),
            Self::Attraction(a) => a.total_count == 0,
            Self::Weather(w) => w.forecast.is_none(),
        }
    }
}
