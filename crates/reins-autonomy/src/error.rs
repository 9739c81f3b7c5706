//! Autonomy error types.

use reins_services::ServiceError;
use reins_types::AutonomyLevel;
use thiserror::Error;

/// Errors from metrics, transition, and evaluation operations.
#[derive(Debug, Error)]
pub enum AutonomyError {
    /// The tenant is not registered (configuration error).
    #[error("unknown tenant: {0}")]
    UnknownTenant(String),

    /// The requested edge is not in the transition graph.
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition {
        from: AutonomyLevel,
        to: AutonomyLevel,
    },

    /// The transition needs a human approver identity and none was given.
    #[error("transition to {to} requires an approver identity")]
    ApprovalRequired { to: AutonomyLevel },

    /// Optimistic-concurrency mismatch: the level moved underneath the
    /// caller. Re-read and retry explicitly.
    #[error("transition conflict: expected {expected}, found {actual}")]
    Conflict {
        expected: AutonomyLevel,
        actual: AutonomyLevel,
    },

    /// An external store call failed.
    #[error("service error: {0}")]
    Service(ServiceError),

    /// A lock was poisoned by a panicking writer.
    #[error("lock error")]
    LockError,
}

impl From<ServiceError> for AutonomyError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::UnknownTenant(tenant) => AutonomyError::UnknownTenant(tenant),
            ServiceError::Conflict { expected, actual } => {
                AutonomyError::Conflict { expected, actual }
            }
            other => AutonomyError::Service(other),
        }
    }
}
