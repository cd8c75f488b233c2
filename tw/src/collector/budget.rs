//! Budget collector - one call per run, not keyed by destination

use tracing::debug;

use super::CollectContext;
use crate::domain::BudgetBreakdown;
use crate::provider::{Capability, ProviderError};

/// Budget breakdown for the framework's total budget
pub async fn collect_budget(ctx: &CollectContext) -> Result<BudgetBreakdown, ProviderError> {
    let total_budget = ctx.framework.total_budget;
    debug!(total_budget, "collect_budget: called");
    let planner = ctx.providers.budget()?;
    ctx.call(Capability::Budget, planner.budget_breakdown(&ctx.framework, total_budget))
        .await
}
