//! Deep needs - the need analyzer's structured output
//!
//! Only the canonical shape is accepted: `deep_preferences` is a list of
//! `{type, preference, confidence, rationale}` records. Anything else fails
//! deserialization or [`DeepNeeds::validate`] and is reported as an upstream
//! contract violation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::predicate::LodgingPredicate;
use crate::error::PlanError;

/// Preference tags the insight generator reacts to
pub mod tags {
    pub const CRAVES_DEEP_CULTURAL_CONTACT: &str = "craves deep cultural contact";
    pub const SEEKS_NON_COMMERCIAL_EXPERIENCE: &str = "seeks non-commercialized experience";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeepPreference {
    #[serde(rename = "type")]
    pub kind: String,
    pub preference: String,
    pub confidence: f64,
    pub rationale: String,
}

impl DeepPreference {
    /// Fixed-string tag membership (trimmed, case-insensitive)
    pub fn is(&self, tag: &str) -> bool {
        self.preference.trim().eq_ignore_ascii_case(tag)
    }
}

/// True when any preference carries `tag`
pub fn has_preference(preferences: &[DeepPreference], tag: &str) -> bool {
    preferences.iter().any(|p| p.is(tag))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Hard,
    Soft,
    Inferred,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Hard => "hard",
            Self::Soft => "soft",
            Self::Inferred => "inferred",
        };
        f.write_str(s)
    }
}

/// A requirement narrowing acceptable options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(rename = "type")]
    pub kind: ConstraintKind,
    #[serde(alias = "constraint")]
    pub text: String,
    #[serde(default)]
    pub strictness: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Explicit predicate; when absent one is derived from `text`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<LodgingPredicate>,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            strictness: String::new(),
            source: None,
            predicate: None,
        }
    }

    pub fn hard(text: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Hard, text)
    }

    pub fn soft(text: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Soft, text)
    }

    pub fn inferred(text: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Inferred, text)
    }

    pub fn with_predicate(mut self, predicate: LodgingPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceNeed {
    pub category: String,
    pub value: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnstatedNeed {
    pub need: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePriority {
    pub value_type: String,
    pub weight: f64,
    #[serde(default)]
    pub indicators: Vec<String>,
}

/// Output of the need analyzer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepNeeds {
    pub surface_needs: Vec<SurfaceNeed>,
    pub deep_preferences: Vec<DeepPreference>,
    pub constraints: Vec<Constraint>,
    pub unstated_needs: Vec<UnstatedNeed>,
    pub value_priorities: Vec<ValuePriority>,
}

impl DeepNeeds {
    /// Check the record-level contract serde cannot express
    pub fn validate(&self) -> Result<(), PlanError> {
        debug!(preferences = self.deep_preferences.len(), "DeepNeeds::validate: called");
        for pref in &self.deep_preferences {
            if !(0.0..=1.0).contains(&pref.confidence) {
                return Err(PlanError::UpstreamContract(format!(
                    "preference '{}' has confidence {} outside [0, 1]",
                    pref.preference, pref.confidence
                )));
            }
            if pref.preference.trim().is_empty() {
                return Err(PlanError::UpstreamContract("preference text is empty".to_string()));
            }
        }
        Ok(())
    }

    pub fn has_preference(&self, tag: &str) -> bool {
        has_preference(&self.deep_preferences, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pref(text: &str, confidence: f64) -> DeepPreference {
        DeepPreference {
            kind: "culture".to_string(),
            preference: text.to_string(),
            confidence,
            rationale: "stated interest".to_string(),
        }
    }

    #[test]
    fn test_tag_membership_is_exact() {
        let prefs = vec![pref("Craves deep cultural contact ", 0.9)];
        assert!(has_preference(&prefs, tags::CRAVES_DEEP_CULTURAL_CONTACT));
        assert!(!has_preference(&prefs, tags::SEEKS_NON_COMMERCIAL_EXPERIENCE));

        let prefs = vec![pref("maybe craves deep cultural contact someday", 0.9)];
        assert!(!has_preference(&prefs, tags::CRAVES_DEEP_CULTURAL_CONTACT));
    }

    #[test]
    fn test_validate_confidence_range() {
        let needs = DeepNeeds {
            deep_preferences: vec![pref("x", 1.4)],
            ..Default::default()
        };
        assert!(matches!(needs.validate(), Err(PlanError::UpstreamContract(_))));
    }

    #[test]
    fn test_constraint_accepts_constraint_alias() {
        let yaml = "type: soft\nconstraint: avoid over-commercialized sites\nstrictness: best effort\n";
        let constraint: Constraint = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(constraint.kind, ConstraintKind::Soft);
        assert_eq!(constraint.text, "avoid over-commercialized sites");
        assert!(constraint.predicate.is_none());
    }

    #[test]
    fn test_non_canonical_preferences_are_rejected() {
        let yaml = "deep_preferences:\n  - craves deep cultural contact\n";
        assert!(serde_yaml::from_str::<DeepNeeds>(yaml).is_err());

        let yaml = "deep_preferences:\n  culture: craves deep cultural contact\n";
        assert!(serde_yaml::from_str::<DeepNeeds>(yaml).is_err());
    }
}
