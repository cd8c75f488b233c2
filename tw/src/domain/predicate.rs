//! Structured lodging predicates
//!
//! A predicate is attribute + operator + value, evaluated against the
//! structured fields of a [`LodgingOption`]. A predicate *keeps* the options it
//! matches.

use serde::{Deserialize, Serialize};

use super::records::LodgingOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LodgingAttribute {
    Features,
    PricePerNight,
    Rating,
}

impl std::fmt::Display for LodgingAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Features => "features",
            Self::PricePerNight => "price-per-night",
            Self::Rating => "rating",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PredicateOp {
    ExcludesAny,
    IncludesAny,
    AtMost,
    AtLeast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredicateValue {
    Number(f64),
    Tags(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LodgingPredicate {
    pub attribute: LodgingAttribute,
    pub op: PredicateOp,
    pub value: PredicateValue,
}

impl LodgingPredicate {
    pub fn excludes_features<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attribute: LodgingAttribute::Features,
            op: PredicateOp::ExcludesAny,
            value: PredicateValue::Tags(tags.into_iter().map(Into::into).collect()),
        }
    }

    pub fn max_price(price: u32) -> Self {
        Self {
            attribute: LodgingAttribute::PricePerNight,
            op: PredicateOp::AtMost,
            value: PredicateValue::Number(f64::from(price)),
        }
    }

    pub fn min_rating(rating: f64) -> Self {
        Self {
            attribute: LodgingAttribute::Rating,
            op: PredicateOp::AtLeast,
            value: PredicateValue::Number(rating),
        }
    }

    /// Whether the predicate keeps `option`
    ///
    /// Returns `None` when attribute, operator and value do not form a valid
    /// combination (e.g. a feature list compared with `at-most`).
    pub fn keeps(&self, option: &LodgingOption) -> Option<bool> {
        match (self.attribute, self.op, &self.value) {
            (LodgingAttribute::Features, PredicateOp::ExcludesAny, PredicateValue::Tags(tags)) => {
                Some(!tags.iter().any(|t| option.has_feature(t)))
            }
            (LodgingAttribute::Features, PredicateOp::IncludesAny, PredicateValue::Tags(tags)) => {
                Some(tags.iter().any(|t| option.has_feature(t)))
            }
            (LodgingAttribute::PricePerNight, op, PredicateValue::Number(n)) => {
                compare(f64::from(option.price_per_night), op, *n)
            }
            (LodgingAttribute::Rating, op, PredicateValue::Number(n)) => compare(option.rating, op, *n),
            _ => None,
        }
    }

    /// Whether `option` carries the attribute this predicate tests
    ///
    /// Numeric attributes are always present; a feature predicate only
    /// references an option that has at least one of the tags.
    pub fn references(&self, option: &LodgingOption) -> bool {
        match (&self.attribute, &self.value) {
            (LodgingAttribute::Features, PredicateValue::Tags(tags)) => tags.iter().any(|t| option.has_feature(t)),
            (LodgingAttribute::Features, _) => false,
            _ => true,
        }
    }
}

impl std::fmt::Display for LodgingPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self.op {
            PredicateOp::ExcludesAny => "excludes any of",
            PredicateOp::IncludesAny => "includes any of",
            PredicateOp::AtMost => "<=",
            PredicateOp::AtLeast => ">=",
        };
        match &self.value {
            PredicateValue::Number(n) => write!(f, "{} {} {}", self.attribute, op, n),
            PredicateValue::Tags(tags) => write!(f, "{} {} [{}]", self.attribute, op, tags.join(", ")),
        }
    }
}

fn compare(actual: f64, op: PredicateOp, bound: f64) -> Option<bool> {
    match op {
        PredicateOp::AtMost => Some(actual <= bound),
        PredicateOp::AtLeast => Some(actual >= bound),
        PredicateOp::ExcludesAny | PredicateOp::IncludesAny => None,
    }
}
