//! Constraint filter
//!
//! Applies soft constraints that map to a structured lodging predicate,
//! narrowing `ranked_options` inside accommodation records. Destinations and
//! category entries are never removed, and a list is never narrowed to
//! nothing. Hard and inferred constraints pass through untouched for the
//! insight stage.
//!
//! The filter is a pure function of (dataset, constraints): running it again
//! on its own output leaves the dataset unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{AccommodationRecord, Constraint, ConstraintKind, Dataset, LodgingOption, LodgingPredicate};

/// A soft constraint the filter could not act on
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("constraint '{text}' not applied: {reason}")]
pub struct ConstraintMismatch {
    pub text: String,
    pub reason: String,
}

/// A soft constraint the filter acted on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedConstraint {
    pub text: String,
    pub predicates: Vec<LodgingPredicate>,
    /// Options in the input the predicates reject
    pub rejected: usize,
}

/// The filtered dataset plus what happened to each constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredDataset {
    pub dataset: Dataset,
    pub applied: Vec<AppliedConstraint>,
    /// Hard and inferred constraints, in input order
    pub deferred: Vec<Constraint>,
    pub ignored: Vec<ConstraintMismatch>,
}

struct TextPattern {
    name: &'static str,
    regex: &'static LazyLock<Option<Regex>>,
    build: fn(&Captures) -> Option<LodgingPredicate>,
}

static COMMERCIAL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(over-?commerciali[sz]|(avoid|no|not|without|less)\b.{0,40}\b(commerciali[sz]|touristy|luxury))")
        .ok()
});

static MAX_PRICE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(price|rate|cost|budget)\b.{0,20}?\b(at most|under|below|no more than|max(imum)?)\s*(\d+)").ok()
});

static MIN_RATING_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)rating\b.{0,20}?\b(at least|above|no less than|min(imum)?)\s*(\d+(\.\d+)?)").ok()
});

static PATTERNS: [TextPattern; 3] = [
    TextPattern {
        name: "over-commercialization",
        regex: &COMMERCIAL_RE,
        build: |_| Some(LodgingPredicate::excludes_features(["luxury", "high-commercial"])),
    },
    TextPattern {
        name: "nightly price cap",
        regex: &MAX_PRICE_RE,
        build: |caps| caps.get(4)?.as_str().parse().ok().map(LodgingPredicate::max_price),
    },
    TextPattern {
        name: "minimum rating",
        regex: &MIN_RATING_RE,
        build: |caps| caps.get(3)?.as_str().parse().ok().map(LodgingPredicate::min_rating),
    },
];

/// Predicates derived from constraint text through the pattern table
pub fn predicates_for_text(text: &str) -> Vec<LodgingPredicate> {
    PATTERNS
        .iter()
        .filter_map(|pattern| {
            let regex = pattern.regex.as_ref()?;
            let caps = regex.captures(text)?;
            let predicate = (pattern.build)(&caps)?;
            debug!(pattern = pattern.name, %predicate, "predicates_for_text: matched");
            Some(predicate)
        })
        .collect()
}

/// Predicates for one constraint: its explicit predicate, else the text mapping
pub fn predicates_for(constraint: &Constraint) -> Vec<LodgingPredicate> {
    match &constraint.predicate {
        Some(predicate) => vec![predicate.clone()],
        None => predicates_for_text(&constraint.text),
    }
}

pub fn filter(dataset: &Dataset, constraints: &[Constraint]) -> FilteredDataset {
    debug!(constraints = constraints.len(), "filter: called");
    let options: Vec<&LodgingOption> = dataset
        .iter()
        .filter_map(|d| d.accommodation())
        .flat_map(|r| r.ranked_options.iter().map(|ranked| &ranked.option))
        .collect();

    let mut applied = Vec::new();
    let mut deferred = Vec::new();
    let mut ignored = Vec::new();

    for constraint in constraints {
        if constraint.kind != ConstraintKind::Soft {
            deferred.push(constraint.clone());
            continue;
        }
        match resolve(constraint, &options) {
            Ok(predicates) => {
                let rejected = options
                    .iter()
                    .filter(|o| predicates.iter().any(|p| p.keeps(o) == Some(false)))
                    .count();
                applied.push(AppliedConstraint {
                    text: constraint.text.clone(),
                    predicates,
                    rejected,
                });
            }
            Err(mismatch) => {
                info!(%mismatch, "Ignoring constraint");
                ignored.push(mismatch);
            }
        }
    }

    let predicates: Vec<&LodgingPredicate> = applied.iter().flat_map(|a| a.predicates.iter()).collect();
    let mut dataset = dataset.clone();
    if !predicates.is_empty() {
        for destination in &mut dataset.destinations {
            let name = destination.destination.to_string();
            if let Some(record) = destination.accommodation_mut() {
                narrow(&name, record, &predicates);
            }
        }
    }

    FilteredDataset {
        dataset,
        applied,
        deferred,
        ignored,
    }
}

fn resolve(constraint: &Constraint, options: &[&LodgingOption]) -> Result<Vec<LodgingPredicate>, ConstraintMismatch> {
    let mismatch = |reason: String| ConstraintMismatch {
        text: constraint.text.clone(),
        reason,
    };

    let predicates = predicates_for(constraint);
    if predicates.is_empty() {
        return Err(mismatch("no filterable attribute recognized".to_string()));
    }

    let mut usable = Vec::new();
    for predicate in predicates {
        let Some(probe) = options.first() else {
            return Err(mismatch("no lodging records to filter".to_string()));
        };
        if predicate.keeps(probe).is_none() {
            return Err(mismatch(format!("'{}' is not a valid predicate", predicate)));
        }
        if options.iter().any(|o| predicate.references(o)) {
            usable.push(predicate);
        }
    }

    if usable.is_empty() {
        return Err(mismatch("attribute not present on any record".to_string()));
    }
    Ok(usable)
}

/// Keep the options every predicate keeps, unless that would keep none
///
/// Only the predicates that reject one of this record's own options take
/// part, so the outcome never depends on what other destinations hold.
fn narrow(destination: &str, record: &mut AccommodationRecord, predicates: &[&LodgingPredicate]) {
    let relevant: Vec<&LodgingPredicate> = predicates
        .iter()
        .copied()
        .filter(|p| record.ranked_options.iter().any(|r| p.keeps(&r.option) == Some(false)))
        .collect();
    if relevant.is_empty() {
        return;
    }

    let kept: Vec<_> = record
        .ranked_options
        .iter()
        .filter(|r| relevant.iter().all(|p| p.keeps(&r.option) != Some(false)))
        .cloned()
        .collect();

    let summary = relevant.iter().map(|p| p.to_string()).collect::<Vec<_>>().join("; ");
    if kept.is_empty() {
        debug!(%destination, "narrow: every option rejected, keeping original list");
        record.filter_note = Some(format!("no option satisfies {}; list kept unchanged", summary));
    } else {
        let removed = record.ranked_options.len() - kept.len();
        debug!(%destination, removed, "narrow: options removed");
        record.filter_note = Some(format!("{} option(s) excluded by {}", removed, summary));
        record.ranked_options = kept;
    }
}
