//! Accommodation collector: theme-driven search parameters and ranking

use async_trait::async_trait;
use tracing::debug;

use super::{CollectContext, Collector};
use crate::domain::{
    AccommodationRecord, Category, CategoryRecord, CommercialLevel, DestinationProfile, LodgingOption,
    LodgingSearchParams, PrimaryTheme, RankedLodging, TravelFramework,
};
use crate::provider::{Capability, LodgingQuery, ProviderError};

const BASE_NIGHTLY_BUDGET: f64 = 300.0;
const BUDGET_CONSCIOUS_BELOW: u32 = 10_000;
const MAX_RANKED: usize = 5;

const QUIET: &str = "quiet";

pub struct AccommodationCollector;

#[async_trait]
impl Collector for AccommodationCollector {
    fn category(&self) -> Category {
        Category::Accommodation
    }

    async fn collect(
        &self,
        destination: &DestinationProfile,
        ctx: &CollectContext,
    ) -> Result<CategoryRecord, ProviderError> {
        debug!(destination = %destination.name, "AccommodationCollector::collect: called");
        let framework = &ctx.framework;
        let search_params = lodging_search_params(framework, destination);

        let query = LodgingQuery {
            city: destination.name.to_string(),
            check_in: framework.travel_dates.check_in,
            check_out: framework.travel_dates.check_out,
            budget_per_night: search_params.budget_per_night,
            keywords: search_params.keywords.clone(),
        };
        let lodging = ctx.providers.lodging()?;
        let options = ctx.call(Capability::Lodging, lodging.search_lodging(&query)).await?;

        let ranked_options = rank(options, framework.theme.primary_theme, &search_params);
        debug!(
            destination = %destination.name,
            ranked = ranked_options.len(),
            "AccommodationCollector::collect: ranked"
        );

        Ok(CategoryRecord::Accommodation(AccommodationRecord {
            ranked_options,
            search_params,
            strategy_note: strategy_note(framework.theme.primary_theme).to_string(),
            filter_note: None,
        }))
    }
}

/// Search parameters for one destination under the framework's theme
pub fn lodging_search_params(framework: &TravelFramework, destination: &DestinationProfile) -> LodgingSearchParams {
    let theme = framework.theme.primary_theme;
    let (mut multiplier, keywords): (f64, &[&str]) = match theme {
        PrimaryTheme::Leisure => (1.5, &["resort", "comfort", "view"]),
        PrimaryTheme::CulturalImmersion => (1.0, &["heritage", "guesthouse", "culture"]),
        PrimaryTheme::NatureExploration | PrimaryTheme::ClassicSightseeing => (0.8, &["budget", "clean", "convenient"]),
    };
    let mut keywords: Vec<String> = keywords.iter().map(|k| k.to_string()).collect();

    if destination.commercial_level == CommercialLevel::Low {
        keywords.push(QUIET.to_string());
        multiplier *= 0.9;
    }

    LodgingSearchParams {
        budget_per_night: (BASE_NIGHTLY_BUDGET * multiplier) as u32,
        quiet_preferred: keywords.iter().any(|k| k == QUIET),
        keywords,
        culture_emphasis: theme == PrimaryTheme::CulturalImmersion,
        budget_conscious: framework.total_budget < BUDGET_CONSCIOUS_BELOW,
    }
}

fn theme_keywords(theme: PrimaryTheme) -> &'static [&'static str] {
    match theme {
        PrimaryTheme::CulturalImmersion => &["heritage", "guesthouse", "culture", "traditional"],
        PrimaryTheme::NatureExploration => &["view", "mountain", "lake", "nature"],
        PrimaryTheme::Leisure => &["comfort", "resort", "luxury", "spa"],
        PrimaryTheme::ClassicSightseeing => &[],
    }
}

/// Recommendation score for one option
///
/// rating x 20, plus 0.3 per unit the price falls below 100, plus 30 per
/// theme keyword found in a feature, plus 25 for a quiet feature when quiet
/// is preferred.
pub fn score_lodging(option: &LodgingOption, theme: PrimaryTheme, params: &LodgingSearchParams) -> f64 {
    let mut score = option.rating * 20.0;

    if option.price_per_night > 0 {
        score += (100.0 - f64::from(option.price_per_night)).max(0.0) * 0.3;
    }

    let features: Vec<String> = option.features.iter().map(|f| f.to_lowercase()).collect();
    for keyword in theme_keywords(theme) {
        if features.iter().any(|f| f.contains(keyword)) {
            score += 30.0;
        }
    }

    if params.quiet_preferred && features.iter().any(|f| f.contains(QUIET)) {
        score += 25.0;
    }

    score
}

fn rank(options: Vec<LodgingOption>, theme: PrimaryTheme, params: &LodgingSearchParams) -> Vec<RankedLodging> {
    let mut ranked: Vec<RankedLodging> = options
        .into_iter()
        .map(|option| {
            let score = score_lodging(&option, theme, params);
            RankedLodging { option, score }
        })
        .collect();
    // Stable: equal scores keep provider order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(MAX_RANKED);
    ranked
}

fn strategy_note(theme: PrimaryTheme) -> &'static str {
    match theme {
        PrimaryTheme::CulturalImmersion => "prefer guesthouses with cultural character close to heritage sites",
        PrimaryTheme::NatureExploration => "prefer lodging with views for early and late photography",
        PrimaryTheme::Leisure => "prioritize comfort and facilities in a convenient location",
        PrimaryTheme::ClassicSightseeing => "stay near transport for easy daily outings",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::testing::{context, context_with};
    use crate::domain::fixtures::framework;

    fn option(name: &str, price: u32, rating: f64, features: &[&str]) -> LodgingOption {
        LodgingOption {
            name: name.to_string(),
            price_per_night: price,
            rating,
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_search_params_low_commercial_adds_quiet() {
        let fw = framework(&["Shaxi"]);
        let shaxi = DestinationProfile::new("Shaxi").with_commercial_level(CommercialLevel::Low);
        let params = lodging_search_params(&fw, &shaxi);
        assert_eq!(params.budget_per_night, 270);
        assert!(params.quiet_preferred);
        assert!(params.culture_emphasis);
        assert!(params.budget_conscious);
        assert_eq!(params.keywords.last().map(String::as_str), Some("quiet"));
    }

    #[test]
    fn test_search_params_leisure_budget() {
        let mut fw = framework(&["Dali"]);
        fw.theme.primary_theme = PrimaryTheme::Leisure;
        fw.total_budget = 20_000;
        let params = lodging_search_params(&fw, &DestinationProfile::new("Dali"));
        assert_eq!(params.budget_per_night, 450);
        assert!(!params.quiet_preferred);
        assert!(!params.budget_conscious);
    }

    #[test]
    fn test_score_components() {
        let params = LodgingSearchParams {
            quiet_preferred: true,
            ..Default::default()
        };
        let cheap = option("Hut", 80, 4.0, &["quiet", "heritage"]);
        // 80 + 6 + 30 (heritage) + 25 (quiet)
        let score = score_lodging(&cheap, PrimaryTheme::CulturalImmersion, &params);
        assert!((score - 141.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_is_stable_and_truncated() {
        let params = LodgingSearchParams::default();
        let options: Vec<_> = (0..7).map(|i| option(&format!("Inn {}", i), 300, 4.0, &[])).collect();
        let ranked = rank(options, PrimaryTheme::ClassicSightseeing, &params);
        assert_eq!(ranked.len(), MAX_RANKED);
        assert_eq!(ranked[0].option.name, "Inn 0");
        assert_eq!(ranked[4].option.name, "Inn 4");
    }

    #[tokio::test]
    async fn test_collect_dali_ranks_cultural_options_first() {
        let ctx = context(&["Dali"]);
        let record = AccommodationCollector
            .collect(&DestinationProfile::new("Dali"), &ctx)
            .await
            .unwrap();
        let CategoryRecord::Accommodation(record) = record else {
            panic!("expected accommodation record");
        };
        assert_eq!(record.ranked_options[0].option.name, "Dali Old Town Guesthouse");
        assert!(record.ranked_options.iter().any(|r| r.option.has_feature("luxury")));
        assert!(!record.strategy_note.is_empty());
    }

    #[tokio::test]
    async fn test_collect_unknown_city_is_empty() {
        let ctx = context_with(framework(&["Atlantis"]));
        let record = AccommodationCollector
            .collect(&DestinationProfile::new("Atlantis"), &ctx)
            .await
            .unwrap();
        assert!(record.is_empty());
    }
}
