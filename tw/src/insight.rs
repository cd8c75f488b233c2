//! Insight generator
//!
//! One deterministic pass over the integrated view, the framework, the deep
//! preferences and the deferred constraints. Each list keeps the order its
//! inputs were received in.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Constraint, ConstraintKind, DeepPreference, TravelFramework, has_preference, tags};
use crate::integrator::IntegratedView;

/// Budget lines above this share of the total are flagged
const BUDGET_SHARE_LIMIT: f64 = 0.35;
/// A breakdown above total budget x this factor is flagged
const BUDGET_OVERRUN_FACTOR: f64 = 1.1;
const ATTRACTION_RICH_AT: usize = 3;
const CROWDED_DESTINATIONS_ABOVE: usize = 3;
const SHORT_TRIP_BELOW_DAYS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightKind {
    AttractionRich,
    ConflictMitigation,
    HardConstraint,
    InferredConstraint,
    BudgetShare,
    ScheduleTight,
    Feasibility,
    BudgetOverrun,
    CultureWorkshop,
    NonCommercial,
    ExtendedStay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    /// Destination or budget category the insight is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

impl Insight {
    fn new(kind: InsightKind, subject: Option<String>, message: String) -> Self {
        Self { kind, subject, message }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightSet {
    pub findings: Vec<Insight>,
    pub recommendations: Vec<Insight>,
    pub warnings: Vec<Insight>,
    pub opportunities: Vec<Insight>,
}

impl InsightSet {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
            && self.recommendations.is_empty()
            && self.warnings.is_empty()
            && self.opportunities.is_empty()
    }
}

pub fn generate(
    view: &IntegratedView,
    framework: &TravelFramework,
    preferences: &[DeepPreference],
    constraints: &[Constraint],
) -> InsightSet {
    debug!(
        summaries = view.summaries.len(),
        preferences = preferences.len(),
        constraints = constraints.len(),
        "generate: called"
    );
    let set = InsightSet {
        findings: findings(view),
        recommendations: recommendations(view, constraints),
        warnings: warnings(view, framework),
        opportunities: opportunities(view, preferences),
    };
    debug!(
        findings = set.findings.len(),
        recommendations = set.recommendations.len(),
        warnings = set.warnings.len(),
        opportunities = set.opportunities.len(),
        "generate: done"
    );
    set
}

fn findings(view: &IntegratedView) -> Vec<Insight> {
    view.summaries
        .iter()
        .filter(|s| s.attraction_count >= ATTRACTION_RICH_AT)
        .map(|s| {
            Insight::new(
                InsightKind::AttractionRich,
                Some(s.destination.to_string()),
                format!(
                    "{} has {} attractions worth visiting; recommended stay {}",
                    s.destination, s.attraction_count, s.recommended_stay
                ),
            )
        })
        .collect()
}

fn recommendations(view: &IntegratedView, constraints: &[Constraint]) -> Vec<Insight> {
    let mut out: Vec<Insight> = view
        .conflicts
        .iter()
        .map(|c| {
            Insight::new(
                InsightKind::ConflictMitigation,
                Some(c.destination.to_string()),
                format!("{}: {}", c.destination, c.mitigation),
            )
        })
        .collect();

    out.extend(constraints.iter().filter_map(|c| match c.kind {
        ConstraintKind::Hard => Some(Insight::new(
            InsightKind::HardConstraint,
            None,
            format!("must be honored: {}", c.text),
        )),
        ConstraintKind::Inferred => Some(Insight::new(
            InsightKind::InferredConstraint,
            None,
            format!("should be honored: {}", c.text),
        )),
        ConstraintKind::Soft => None,
    }));
    out
}

fn warnings(view: &IntegratedView, framework: &TravelFramework) -> Vec<Insight> {
    let mut out = Vec::new();

    if let Some(budget) = &view.budget {
        for line in budget.lines.iter().filter(|l| l.ratio > BUDGET_SHARE_LIMIT) {
            out.push(Insight::new(
                InsightKind::BudgetShare,
                Some(line.category.clone()),
                format!(
                    "{} takes {:.1}% of the budget; look for savings there",
                    line.category,
                    line.ratio * 100.0
                ),
            ));
        }
    }

    let destinations = view.summaries.len();
    if destinations > CROWDED_DESTINATIONS_ABOVE && framework.duration_days < SHORT_TRIP_BELOW_DAYS {
        out.push(Insight::new(
            InsightKind::ScheduleTight,
            None,
            format!(
                "{} destinations in {} days is a tight schedule; consider dropping one",
                destinations, framework.duration_days
            ),
        ));
    }

    let needed: f64 = view.summaries.iter().map(|s| s.recommended_stay.estimated_days()).sum();
    if needed > f64::from(framework.duration_days) {
        out.push(Insight::new(
            InsightKind::Feasibility,
            None,
            format!(
                "the recommended stays add up to about {:.1} days but the trip is {} days",
                needed, framework.duration_days
            ),
        ));
    }

    if let Some(budget) = &view.budget {
        let total = budget.total_amount();
        let limit = f64::from(framework.total_budget) * BUDGET_OVERRUN_FACTOR;
        if total as f64 > limit {
            out.push(Insight::new(
                InsightKind::BudgetOverrun,
                None,
                format!(
                    "the budget breakdown totals {} against a budget of {}",
                    total, framework.total_budget
                ),
            ));
        }
    }

    out
}

fn opportunities(view: &IntegratedView, preferences: &[DeepPreference]) -> Vec<Insight> {
    let mut out = Vec::new();

    if has_preference(preferences, tags::CRAVES_DEEP_CULTURAL_CONTACT) {
        out.push(Insight::new(
            InsightKind::CultureWorkshop,
            None,
            "join a hands-on workshop with local artisans, such as tie-dye or silverwork".to_string(),
        ));
    }
    if has_preference(preferences, tags::SEEKS_NON_COMMERCIAL_EXPERIENCE) {
        out.push(Insight::new(
            InsightKind::NonCommercial,
            None,
            "favor low-commercial villages and family-run guesthouses off the main tourist circuit".to_string(),
        ));
    }

    out.extend(view.opportunities.iter().map(|o| {
        Insight::new(
            InsightKind::ExtendedStay,
            Some(o.destination.to_string()),
            o.description.clone(),
        )
    }));
    out
}
