//! Service error types.

use reins_types::AutonomyLevel;
use thiserror::Error;

/// Errors surfaced by external collaborators.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service could not be reached or failed internally.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service answered, but the payload could not be interpreted.
    #[error("invalid service response: {0}")]
    InvalidResponse(String),

    /// The tenant is not registered with the store.
    #[error("unknown tenant: {0}")]
    UnknownTenant(String),

    /// Optimistic-concurrency mismatch: the stored level moved underneath
    /// the caller. Retry explicitly with a fresh read.
    #[error("level conflict: expected {expected}, found {actual}")]
    Conflict {
        expected: AutonomyLevel,
        actual: AutonomyLevel,
    },
}

impl ServiceError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Conflict { .. })
    }
}
