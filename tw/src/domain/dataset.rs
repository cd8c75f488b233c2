//! Dataset - the joined per-destination, per-category collection result

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::category::{Category, DestinationKey};
use super::records::{AccommodationRecord, AttractionRecord, CategoryRecord, TransportRecord, WeatherRecord};

/// One (destination, category) slot: a record plus a failure marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub record: CategoryRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl CategoryEntry {
    pub fn collected(record: CategoryRecord) -> Self {
        Self { record, failure: None }
    }

    /// Empty record marked with the reason collection failed
    pub fn failed(category: Category, reason: impl Into<String>) -> Self {
        Self {
            record: CategoryRecord::empty(category),
            failure: Some(reason.into()),
        }
    }

    pub fn category(&self) -> Category {
        self.record.category()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Collected without failure and carrying data
    pub fn is_complete(&self) -> bool {
        !self.is_failed() && !self.record.is_empty()
    }
}

/// All category entries for one destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationData {
    pub destination: DestinationKey,
    pub entries: BTreeMap<Category, CategoryEntry>,
}

impl DestinationData {
    pub fn entry(&self, category: Category) -> Option<&CategoryEntry> {
        self.entries.get(&category)
    }

    pub fn transportation(&self) -> Option<&TransportRecord> {
        match self.entry(Category::Transportation).map(|e| &e.record) {
            Some(CategoryRecord::Transportation(r)) => Some(r),
            _ => None,
        }
    }

    pub fn accommodation(&self) -> Option<&AccommodationRecord> {
        match self.entry(Category::Accommodation).map(|e| &e.record) {
            Some(CategoryRecord::Accommodation(r)) => Some(r),
            _ => None,
        }
    }

    pub fn accommodation_mut(&mut self) -> Option<&mut AccommodationRecord> {
        match self.entries.get_mut(&Category::Accommodation).map(|e| &mut e.record) {
            Some(CategoryRecord::Accommodation(r)) => Some(r),
            _ => None,
        }
    }

    pub fn attraction(&self) -> Option<&AttractionRecord> {
        match self.entry(Category::Attraction).map(|e| &e.record) {
            Some(CategoryRecord::Attraction(r)) => Some(r),
            _ => None,
        }
    }

    pub fn weather(&self) -> Option<&WeatherRecord> {
        match self.entry(Category::Weather).map(|e| &e.record) {
            Some(CategoryRecord::Weather(r)) => Some(r),
            _ => None,
        }
    }
}

/// One budget category line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub category: String,
    pub amount: u32,
    pub ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Budget breakdown by spending category, in provider order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub lines: Vec<BudgetLine>,
}

impl BudgetBreakdown {
    pub fn total_amount(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.amount)).sum()
    }

    pub fn line(&self, category: &str) -> Option<&BudgetLine> {
        self.lines.iter().find(|l| l.category == category)
    }
}

/// The distinguished budget entry of a dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub breakdown: Option<BudgetBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl BudgetEntry {
    pub fn collected(breakdown: BudgetBreakdown) -> Self {
        Self {
            breakdown: Some(breakdown),
            failure: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            breakdown: None,
            failure: Some(reason.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.breakdown.is_some()
    }
}

/// Joined collection result for a planning run
///
/// Every destination carries exactly one entry per [`Category`]; destinations
/// keep the order they were requested in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub destinations: Vec<DestinationData>,
    pub budget: BudgetEntry,
}

impl Dataset {
    /// Assemble a dataset from per-key slots
    ///
    /// Slots for destinations outside `order` are dropped; (destination,
    /// category) pairs without a slot get a failed entry.
    pub fn assemble(
        order: &[DestinationKey],
        mut slots: HashMap<(DestinationKey, Category), CategoryEntry>,
        budget: BudgetEntry,
    ) -> Self {
        debug!(destinations = order.len(), slots = slots.len(), "Dataset::assemble: called");
        let destinations = order
            .iter()
            .map(|destination| {
                let entries = Category::ALL
                    .iter()
                    .map(|&category| {
                        let entry = slots
                            .remove(&(destination.clone(), category))
                            .unwrap_or_else(|| CategoryEntry::failed(category, "no result reported"));
                        (category, entry)
                    })
                    .collect();
                DestinationData {
                    destination: destination.clone(),
                    entries,
                }
            })
            .collect();

        if !slots.is_empty() {
            debug!(dropped = slots.len(), "Dataset::assemble: dropping slots for unrequested destinations");
        }

        Self { destinations, budget }
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn get(&self, destination: &str) -> Option<&DestinationData> {
        self.destinations.iter().find(|d| d.destination == destination)
    }

    pub fn contains(&self, destination: &str) -> bool {
        self.get(destination).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &DestinationKey> {
        self.destinations.iter().map(|d| &d.destination)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DestinationData> {
        self.destinations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::WeatherRecord;

    fn keys(names: &[&str]) -> Vec<DestinationKey> {
        names.iter().map(|n| DestinationKey::from(*n)).collect()
    }

    #[test]
    fn test_assemble_fills_missing_slots() {
        let mut slots = HashMap::new();
        slots.insert(
            (DestinationKey::from("Dali"), Category::Weather),
            CategoryEntry::collected(CategoryRecord::Weather(WeatherRecord::default())),
        );

        let dataset = Dataset::assemble(&keys(&["Dali", "Shaxi"]), slots, BudgetEntry::default());

        assert_eq!(dataset.len(), 2);
        for data in dataset.iter() {
            assert_eq!(data.entries.len(), 4);
        }
        let dali = dataset.get("Dali").unwrap();
        assert!(!dali.entry(Category::Weather).unwrap().is_failed());
        assert!(dali.entry(Category::Accommodation).unwrap().is_failed());
    }

    #[test]
    fn test_assemble_preserves_request_order_and_drops_strays() {
        let mut slots = HashMap::new();
        slots.insert(
            (DestinationKey::from("Nowhere"), Category::Weather),
            CategoryEntry::failed(Category::Weather, "x"),
        );

        let dataset = Dataset::assemble(&keys(&["Lijiang", "Dali"]), slots, BudgetEntry::default());
        let order: Vec<_> = dataset.keys().map(|k| k.as_str()).collect();
        assert_eq!(order, vec!["Lijiang", "Dali"]);
        assert!(!dataset.contains("Nowhere"));
    }

    #[test]
    fn test_failed_entry_is_incomplete() {
        let entry = CategoryEntry::failed(Category::Accommodation, "timeout");
        assert!(entry.is_failed());
        assert!(!entry.is_complete());
        assert_eq!(entry.category(), Category::Accommodation);
    }

    #[test]
    fn test_budget_total() {
        let breakdown = BudgetBreakdown {
            lines: vec![
                BudgetLine {
                    category: "transportation".to_string(),
                    amount: 2800,
                    ratio: 0.35,
                    rationale: None,
                },
                BudgetLine {
                    category: "food".to_string(),
                    amount: 1200,
                    ratio: 0.15,
                    rationale: None,
                },
            ],
        };
        assert_eq!(breakdown.total_amount(), 4000);
        assert_eq!(breakdown.line("food").unwrap().amount, 1200);
    }
}
