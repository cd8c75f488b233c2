//! Quality assessment over a joined dataset
//!
//! Completeness counts complete (destination, category) entries against
//! `destinations x 4`; the budget entry is reported separately and never
//! counted. Gaps in a critical category (accommodation, transportation)
//! mark the dataset as needing completion. Re-fetching is left to the
//! caller, see [`QualityReport::completion_requests`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Category, Dataset, DestinationKey};

/// One (destination, category) gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub destination: DestinationKey,
    pub category: Category,
    pub critical: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Ratio of complete entries, in [0, 1]
    pub completeness: f64,
    /// Gaps in destination order, then category order
    pub issues: Vec<QualityIssue>,
    pub needs_completion: bool,
    pub budget_available: bool,
}

impl QualityReport {
    /// The gaps a caller may re-request
    pub fn completion_requests(&self) -> Vec<(DestinationKey, Category)> {
        self.issues
            .iter()
            .map(|issue| (issue.destination.clone(), issue.category))
            .collect()
    }

    pub fn critical_issues(&self) -> impl Iterator<Item = &QualityIssue> {
        self.issues.iter().filter(|issue| issue.critical)
    }
}

pub fn assess(dataset: &Dataset) -> QualityReport {
    debug!(destinations = dataset.len(), "assess: called");
    let expected = dataset.len() * Category::ALL.len();
    let mut complete = 0usize;
    let mut issues = Vec::new();

    for destination in dataset.iter() {
        for category in Category::ALL {
            match destination.entry(category) {
                Some(entry) if entry.is_complete() => complete += 1,
                entry => {
                    let reason = match entry {
                        Some(e) => e.failure.clone().unwrap_or_else(|| "no data returned".to_string()),
                        None => "entry missing".to_string(),
                    };
                    issues.push(QualityIssue {
                        destination: destination.destination.clone(),
                        category,
                        critical: category.is_critical(),
                        reason,
                    });
                }
            }
        }
    }

    let completeness = if expected == 0 {
        0.0
    } else {
        complete as f64 / expected as f64
    };
    let needs_completion = issues.iter().any(|issue| issue.critical);

    for issue in issues.iter().filter(|i| i.critical) {
        warn!(
            destination = %issue.destination,
            category = %issue.category,
            reason = %issue.reason,
            "Critical category missing"
        );
    }
    debug!(completeness, issues = issues.len(), needs_completion, "assess: done");

    QualityReport {
        completeness,
        issues,
        needs_completion,
        budget_available: dataset.budget.is_available(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::domain::fixtures::dates;
    use crate::domain::{
        AccommodationRecord, AttractionRecord, BudgetBreakdown, BudgetEntry, CategoryEntry, CategoryRecord, Flight,
        Forecast, LodgingOption, RankedLodging, TransportRecord, WeatherCondition, WeatherRecord,
    };

    fn nonempty(category: Category) -> CategoryRecord {
        match category {
            Category::Attraction => CategoryRecord::Attraction(AttractionRecord {
                total_count: 1,
                ..Default::default()
            }),
            Category::Weather => CategoryRecord::Weather(WeatherRecord {
                forecast: Some(Forecast {
                    date: dates().check_in,
                    condition: WeatherCondition::Clear,
                    high_temp: 20,
                    low_temp: 10,
                    precipitation_probability: 0,
                }),
            }),
            Category::Transportation => CategoryRecord::Transportation(TransportRecord {
                flights: vec![Flight {
                    carrier: "Air China".to_string(),
                    flight_no: "CA1".to_string(),
                    depart_time: "08:00".to_string(),
                    arrive_time: "11:00".to_string(),
                    price: 1000,
                }],
                ..Default::default()
            }),
            Category::Accommodation => CategoryRecord::Accommodation(AccommodationRecord {
                ranked_options: vec![RankedLodging {
                    option: LodgingOption {
                        name: "Inn".to_string(),
                        price_per_night: 200,
                        rating: 4.0,
                        features: vec![],
                    },
                    score: 80.0,
                }],
                ..Default::default()
            }),
        }
    }

    fn dataset(names: &[&str], gaps: &[(&str, Category)]) -> Dataset {
        let order: Vec<DestinationKey> = names.iter().map(|n| DestinationKey::new(*n)).collect();
        let mut slots = HashMap::new();
        for key in &order {
            for category in Category::ALL {
                let entry = if gaps.iter().any(|(d, c)| *d == key.as_str() && *c == category) {
                    CategoryEntry::failed(category, "provider unavailable")
                } else {
                    CategoryEntry::collected(nonempty(category))
                };
                slots.insert((key.clone(), category), entry);
            }
        }
        Dataset::assemble(&order, slots, BudgetEntry::collected(BudgetBreakdown::default()))
    }

    #[test]
    fn test_complete_dataset() {
        let report = assess(&dataset(&["Dali", "Shaxi"], &[]));
        assert_eq!(report.completeness, 1.0);
        assert!(report.issues.is_empty());
        assert!(!report.needs_completion);
        assert!(report.budget_available);
    }

    #[test]
    fn test_critical_gap_needs_completion() {
        let report = assess(&dataset(&["Dali", "Lijiang"], &[("Lijiang", Category::Accommodation)]));
        assert_eq!(report.completeness, 7.0 / 8.0);
        assert!(report.needs_completion);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].destination, "Lijiang");
        assert_eq!(report.issues[0].category, Category::Accommodation);
        assert_eq!(report.issues[0].reason, "provider unavailable");
        assert_eq!(
            report.completion_requests(),
            vec![(DestinationKey::new("Lijiang"), Category::Accommodation)]
        );
    }

    #[test]
    fn test_non_critical_gap_does_not_need_completion() {
        let report = assess(&dataset(&["Dali"], &[("Dali", Category::Weather)]));
        assert_eq!(report.completeness, 0.75);
        assert!(!report.needs_completion);
        assert_eq!(report.critical_issues().count(), 0);
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_empty_record_counts_as_gap() {
        let order = vec![DestinationKey::new("Dali")];
        let mut slots = HashMap::new();
        for category in Category::ALL {
            slots.insert((order[0].clone(), category), CategoryEntry::collected(CategoryRecord::empty(category)));
        }
        let report = assess(&Dataset::assemble(&order, slots, BudgetEntry::failed("down")));
        assert_eq!(report.completeness, 0.0);
        assert_eq!(report.issues.len(), 4);
        assert_eq!(report.issues[0].reason, "no data returned");
        assert!(!report.budget_available);
    }
}
