//! Facade error type.

use reins_autonomy::AutonomyError;
use reins_services::ServiceError;
use reins_shadow::ShadowError;
use thiserror::Error;

/// Errors surfaced by the governance facade.
#[derive(Debug, Error)]
pub enum GovernorError {
    /// A promotion was requested but the thresholds are not met.
    #[error("tenant is not promotion-eligible: {}", blockers.join("; "))]
    NotEligible { blockers: Vec<String> },

    #[error(transparent)]
    Autonomy(#[from] AutonomyError),

    #[error(transparent)]
    Shadow(#[from] ShadowError),

    #[error("service error: {0}")]
    Service(#[from] ServiceError),
}
