//! Destination keys and data categories

use serde::{Deserialize, Serialize};

/// Opaque identifier of a destination, unique within a planning run
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationKey(String);

impl DestinationKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DestinationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DestinationKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DestinationKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for DestinationKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DestinationKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Per-destination data category
///
/// Declaration order is the iteration order used everywhere downstream.
/// Budget is not a category: it is a single top-level entry per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Transportation,
    Accommodation,
    Attraction,
    Weather,
}

impl Category {
    /// Every category, in iteration order
    pub const ALL: [Category; 4] = [
        Category::Transportation,
        Category::Accommodation,
        Category::Attraction,
        Category::Weather,
    ];

    /// Critical categories make a destination unplannable when missing
    pub fn is_critical(self) -> bool {
        matches!(self, Category::Accommodation | Category::Transportation)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transportation => "Transportation",
            Self::Accommodation => "Accommodation",
            Self::Attraction => "Attraction",
            Self::Weather => "Weather",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "transportation" | "transport" => Ok(Self::Transportation),
            "accommodation" | "lodging" => Ok(Self::Accommodation),
            "attraction" | "attractions" => Ok(Self::Attraction),
            "weather" => Ok(Self::Weather),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}
