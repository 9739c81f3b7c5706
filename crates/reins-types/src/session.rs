//! Shadow sessions: bounded periods of passive observation.

use crate::{SessionId, TenantId};
use serde::{Deserialize, Serialize};

/// What kinds of human actions a session may capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    /// An outbound message a human wrote.
    Message,
    /// A judgment call a human made (advance, reject, prioritize).
    Decision,
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionKind::Message => write!(f, "message"),
            InteractionKind::Decision => write!(f, "decision"),
        }
    }
}

/// Lifecycle state of a shadow session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Active,
    Paused,
    /// Terminal. Triggers the final learning pass.
    Completed,
}

/// Session-level capture configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Allow-list of interaction kinds this session captures.
    pub capture_kinds: Vec<InteractionKind>,
    /// Run the learning aggregator every N compared interactions.
    pub learning_batch_size: usize,
    /// Similarity at or above which an agent alternative counts as a match.
    pub comparison_threshold: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capture_kinds: vec![InteractionKind::Message, InteractionKind::Decision],
            learning_batch_size: 10,
            comparison_threshold: 0.7,
        }
    }
}

impl SessionConfig {
    pub fn captures(&self, kind: InteractionKind) -> bool {
        self.capture_kinds.contains(&kind)
    }
}

/// Running counters for a session. Updated synchronously at capture time and
/// asynchronously as comparisons settle; compared/match counts are eventual.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_interactions: usize,
    pub message_count: usize,
    pub decision_count: usize,
    pub compared_count: usize,
    pub match_count: usize,
}

impl SessionStats {
    /// Fraction of compared interactions where the agent matched the human.
    pub fn match_rate(&self) -> f64 {
        if self.compared_count == 0 {
            0.0
        } else {
            self.match_count as f64 / self.compared_count as f64
        }
    }
}

/// A bounded period of passive observation for one tenant.
///
/// Exactly one session per tenant may be active (or paused) at a time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShadowSession {
    pub id: SessionId,
    pub tenant_id: TenantId,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
    pub status: SessionStatus,
    pub config: SessionConfig,
    pub stats: SessionStats,
}

impl ShadowSession {
    pub fn new(tenant_id: TenantId, config: SessionConfig) -> Self {
        Self {
            id: SessionId::generate(),
            tenant_id,
            started_at: chrono::Utc::now(),
            ended_at: None,
            status: SessionStatus::Active,
            config,
            stats: SessionStats::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn is_terminal(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}
