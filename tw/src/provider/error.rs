//! Provider error types

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// External capability a provider registry must supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Flights,
    Transit,
    Lodging,
    Weather,
    Budget,
    Attractions,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Flights,
        Capability::Transit,
        Capability::Lodging,
        Capability::Weather,
        Capability::Budget,
        Capability::Attractions,
    ];
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Flights => "flights",
            Self::Transit => "transit",
            Self::Lodging => "lodging",
            Self::Weather => "weather",
            Self::Budget => "budget",
            Self::Attractions => "attractions",
        };
        f.write_str(s)
    }
}

/// A single provider call failed
///
/// Always recovered inside the owning collection task.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("{capability} provider unavailable: {message}")]
    Unavailable { capability: Capability, message: String },

    #[error("{capability} call timed out after {after:?}")]
    Timeout { capability: Capability, after: Duration },

    #[error("{capability} returned an invalid response: {message}")]
    InvalidResponse { capability: Capability, message: String },

    #[error("{capability} has no data for '{location}'")]
    UnknownLocation { capability: Capability, location: String },
}

impl ProviderError {
    pub fn unavailable(capability: Capability, message: impl Into<String>) -> Self {
        Self::Unavailable {
            capability,
            message: message.into(),
        }
    }

    pub fn capability(&self) -> Capability {
        match self {
            Self::Unavailable { capability, .. }
            | Self::Timeout { capability, .. }
            | Self::InvalidResponse { capability, .. }
            | Self::UnknownLocation { capability, .. } => *capability,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = ProviderError::Timeout {
            capability: Capability::Weather,
            after: Duration::from_millis(250),
        };
        assert!(err.is_timeout());
        assert_eq!(err.capability(), Capability::Weather);
        assert!(err.to_string().contains("weather"));
        assert!(err.to_string().contains("250ms"));
    }

    #[test]
    fn test_unknown_location_message() {
        let err = ProviderError::UnknownLocation {
            capability: Capability::Weather,
            location: "Atlantis".to_string(),
        };
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("Atlantis"));
    }
}
