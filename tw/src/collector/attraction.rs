//! Attraction collector: catalog lookup, theme filtering, grouping by type

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use super::{CollectContext, Collector};
use crate::domain::{
    Attraction, AttractionAdvice, AttractionRecord, Category, CategoryRecord, CommercialLevel, DestinationProfile,
    PrimaryTheme,
};
use crate::provider::{Capability, ProviderError};

const CULTURE_TYPE: &str = "culture";
const HIGH_COMMERCIAL_NOTE: &str = "highly commercialized, kept for its cultural significance";

pub struct AttractionCollector;

#[async_trait]
impl Collector for AttractionCollector {
    fn category(&self) -> Category {
        Category::Attraction
    }

    async fn collect(
        &self,
        destination: &DestinationProfile,
        ctx: &CollectContext,
    ) -> Result<CategoryRecord, ProviderError> {
        debug!(destination = %destination.name, "AttractionCollector::collect: called");
        let catalog = ctx.providers.attractions()?;
        let all = ctx
            .call(Capability::Attractions, catalog.attractions(destination.name.as_str()))
            .await?;

        let theme = ctx.framework.theme.primary_theme;
        let kept = filter_by_theme(all, theme);
        debug!(destination = %destination.name, kept = kept.len(), "AttractionCollector::collect: filtered");

        Ok(CategoryRecord::Attraction(organize(kept, theme)))
    }
}

/// Type keywords each theme keeps, matched against an attraction's type or tags
fn theme_types(theme: PrimaryTheme) -> &'static [&'static str] {
    match theme {
        PrimaryTheme::CulturalImmersion => &["culture", "history", "folk"],
        PrimaryTheme::NatureExploration => &["nature", "scenery", "outdoor"],
        PrimaryTheme::Leisure => &["leisure", "relax", "experience"],
        PrimaryTheme::ClassicSightseeing => &["iconic", "must-see", "landmark"],
    }
}

fn matches_any(attraction: &Attraction, types: &[&str]) -> bool {
    let kind = attraction.kind.to_lowercase();
    types.iter().any(|t| {
        kind.contains(t)
            || attraction
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(t))
    })
}

fn filter_by_theme(attractions: Vec<Attraction>, theme: PrimaryTheme) -> Vec<Attraction> {
    let types = theme_types(theme);

    attractions
        .into_iter()
        .filter_map(|mut attraction| {
            let matches_theme = matches_any(&attraction, types);

            if theme == PrimaryTheme::CulturalImmersion && attraction.commercial_level == CommercialLevel::High {
                if attraction.has_tag("heritage") {
                    attraction.note = Some(HIGH_COMMERCIAL_NOTE.to_string());
                    return Some(attraction);
                }
                return None;
            }

            matches_theme.then_some(attraction)
        })
        .collect()
}

fn organize(attractions: Vec<Attraction>, theme: PrimaryTheme) -> AttractionRecord {
    if attractions.is_empty() {
        return AttractionRecord::default();
    }

    let mut recommendations = Vec::new();
    if theme == PrimaryTheme::CulturalImmersion {
        let suggestions: Vec<String> = attractions
            .iter()
            .filter(|a| a.kind.eq_ignore_ascii_case(CULTURE_TYPE))
            .take(2)
            .map(|a| format!("spend time at {}", a.name))
            .collect();
        if !suggestions.is_empty() {
            recommendations.push(AttractionAdvice {
                focus: "cultural immersion".to_string(),
                suggestions,
                reason: "matches the interest in local ethnic culture".to_string(),
            });
        }
    }

    let total_hours: u32 = attractions.iter().map(|a| a.time_needed.hours()).sum();
    recommendations.push(AttractionAdvice {
        focus: "time allocation".to_string(),
        suggestions: vec![format!("about {} hours to visit every attraction", total_hours)],
        reason: "plan ahead to avoid rushing".to_string(),
    });

    let total_count = attractions.len();
    let mut groups_by_type: BTreeMap<String, Vec<Attraction>> = BTreeMap::new();
    for attraction in attractions {
        groups_by_type.entry(attraction.kind.clone()).or_default().push(attraction);
    }

    AttractionRecord {
        groups_by_type,
        recommendations,
        total_count,
    }
}
