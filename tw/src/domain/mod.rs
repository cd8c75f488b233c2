//! Domain types for TripWeaver
//!
//! Upstream inputs (travel framework, deep needs), the per-category record
//! model, and the joined dataset the pipeline stages transform.

mod category;
mod dataset;
mod framework;
mod needs;
mod predicate;
mod records;

pub use category::{Category, DestinationKey};
pub use dataset::{BudgetBreakdown, BudgetEntry, BudgetLine, CategoryEntry, Dataset, DestinationData};
pub use framework::{
    CommercialLevel, DestinationProfile, PacingStrategy, PrimaryTheme, Theme, TravelDates, TravelFramework,
};
pub use needs::{
    Constraint, ConstraintKind, DeepNeeds, DeepPreference, SurfaceNeed, UnstatedNeed, ValuePriority, has_preference,
    tags,
};
pub use predicate::{LodgingAttribute, LodgingPredicate, PredicateOp, PredicateValue};
pub use records::{
    AccommodationRecord, Attraction, AttractionAdvice, AttractionRecord, CategoryRecord, Flight, Forecast,
    LodgingOption, LodgingSearchParams, RankedLodging, TransitMode, TransitOption, TransportAdvice, TransportLeg,
    TransportRecord, VisitLength, WeatherCondition, WeatherRecord,
};

#[cfg(test)]
pub(crate) use framework::fixtures;
