//! Autonomy transition records.
//!
//! Every level change is recorded as an immutable transition. Histories are
//! append-only per tenant and must chain: transition *k*'s `from_level`
//! equals transition *k−1*'s `to_level`.

use crate::{AutonomyLevel, TenantId, TransitionId};
use serde::{Deserialize, Serialize};

/// Who initiated a level change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionInitiator {
    /// The evaluator or another automated path.
    System,
    /// A named human operator.
    Operator(String),
}

/// An immutable record of one autonomy level change. Never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutonomyTransition {
    pub id: TransitionId,
    pub tenant_id: TenantId,
    pub from_level: AutonomyLevel,
    pub to_level: AutonomyLevel,
    /// Human-readable reason for the change.
    pub reason: String,
    pub initiated_by: TransitionInitiator,
    /// Identity of the human who approved the change, when one was required.
    pub approved_by: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AutonomyTransition {
    pub fn new(
        tenant_id: TenantId,
        from_level: AutonomyLevel,
        to_level: AutonomyLevel,
        reason: impl Into<String>,
        initiated_by: TransitionInitiator,
        approved_by: Option<String>,
    ) -> Self {
        Self {
            id: TransitionId::generate(),
            tenant_id,
            from_level,
            to_level,
            reason: reason.into(),
            initiated_by,
            approved_by,
            timestamp: chrono::Utc::now(),
        }
    }

    /// A promotion moves up the ladder; pauses and resumes are neither.
    pub fn is_promotion(&self) -> bool {
        !self.from_level.is_paused()
            && !self.to_level.is_paused()
            && self.to_level.rank() > self.from_level.rank()
    }
}

/// The current governance state of a tenant, as held by the tenant store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TenantRecord {
    pub tenant_id: TenantId,
    pub level: AutonomyLevel,
    /// When the tenant entered its current level.
    pub level_since: chrono::DateTime<chrono::Utc>,
}

impl TenantRecord {
    pub fn new(tenant_id: TenantId, level: AutonomyLevel) -> Self {
        Self {
            tenant_id,
            level,
            level_since: chrono::Utc::now(),
        }
    }

    /// Hours the tenant has spent at its current level.
    pub fn hours_in_level(&self, now: chrono::DateTime<chrono::Utc>) -> f64 {
        (now - self.level_since).num_seconds().max(0) as f64 / 3600.0
    }
}
