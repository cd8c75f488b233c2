//! Fatal planning errors
//!
//! Only malformed input fails a run. Per-task provider failures never surface
//! here: they are isolated inside the collection task (see
//! [`crate::provider::ProviderError`]).

use thiserror::Error;

use crate::domain::DestinationKey;
use crate::provider::Capability;

/// Errors that abort a planning run before any task is launched
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Framework has no destinations")]
    NoDestinations,

    #[error("Destination '{0}' appears more than once")]
    DuplicateDestination(DestinationKey),

    #[error("Invalid framework: {0}")]
    InvalidFramework(String),

    #[error("Provider registry is missing the {0} capability")]
    MissingCapability(Capability),

    #[error("Upstream contract violation: {0}")]
    UpstreamContract(String),

    #[error("Planning run cancelled")]
    Cancelled,
}

impl PlanError {
    /// Input errors are the caller's to fix; cancellation is not an input error
    pub fn is_input_error(&self) -> bool {
        !matches!(self, PlanError::Cancelled)
    }
}
