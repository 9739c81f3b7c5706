//! Shadow session error types.

use reins_types::{InteractionKind, SessionStatus};
use thiserror::Error;

/// Errors from session lifecycle and capture operations.
#[derive(Debug, Error)]
pub enum ShadowError {
    /// The tenant has no session able to capture right now.
    #[error("no active shadow session for tenant {0}")]
    NoActiveSession(String),

    /// The tenant already has a live (active or paused) session.
    #[error("tenant {0} already has a shadow session")]
    SessionAlreadyActive(String),

    /// No session with that id exists.
    #[error("unknown shadow session: {0}")]
    SessionNotFound(String),

    /// The session's capture allow-list excludes this interaction kind.
    #[error("session does not capture {0} interactions")]
    KindNotCaptured(InteractionKind),

    /// A lifecycle call found the session in the wrong state.
    #[error("session is {actual:?}, operation needs {needed:?}")]
    InvalidState {
        needed: SessionStatus,
        actual: SessionStatus,
    },

    /// A lock was poisoned by a panicking writer.
    #[error("lock error")]
    LockError,
}
