//! Transition control: the only legal way a tenant's autonomy level changes.
//!
//! The edge graph is fixed:
//!
//! - promotion chain: onboarding -> shadow_mode -> supervised -> autonomous
//! - demotion edges: autonomous -> supervised, supervised -> shadow_mode
//! - any active level -> paused
//! - paused -> any active level (explicit resume target)
//!
//! Writes go through the tenant store's compare-and-set, so two competing
//! transitions against a stale read cannot both succeed. Every applied
//! transition is appended to an immutable per-tenant history.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use reins_services::TenantStore;
use reins_types::{AutonomyLevel, AutonomyTransition, TenantId, TransitionInitiator};
use tracing::info;

use crate::error::AutonomyError;

/// A requested level change, validated before being applied.
#[derive(Clone, Debug)]
pub struct TransitionRequest {
    pub tenant_id: TenantId,
    pub from_level: AutonomyLevel,
    pub to_level: AutonomyLevel,
    pub reason: String,
    pub initiated_by: TransitionInitiator,
    pub approved_by: Option<String>,
}

/// Applies level changes and records their history.
pub struct TransitionController {
    tenants: Arc<dyn TenantStore>,
    history: RwLock<HashMap<TenantId, Vec<AutonomyTransition>>>,
}

impl TransitionController {
    pub fn new(tenants: Arc<dyn TenantStore>) -> Self {
        Self {
            tenants,
            history: RwLock::new(HashMap::new()),
        }
    }

    /// Validate and apply a level change.
    ///
    /// `from_level` is the caller's read of the current level; a concurrent
    /// change surfaces as [`AutonomyError::Conflict`] and nothing is written.
    pub async fn transition(
        &self,
        request: TransitionRequest,
    ) -> Result<AutonomyTransition, AutonomyError> {
        if !is_legal_edge(request.from_level, request.to_level) {
            return Err(AutonomyError::IllegalTransition {
                from: request.from_level,
                to: request.to_level,
            });
        }

        if needs_approver(request.from_level, request.to_level) && request.approved_by.is_none() {
            return Err(AutonomyError::ApprovalRequired {
                to: request.to_level,
            });
        }

        self.tenants
            .compare_and_set(&request.tenant_id, request.from_level, request.to_level)
            .await?;

        let record = AutonomyTransition::new(
            request.tenant_id.clone(),
            request.from_level,
            request.to_level,
            request.reason,
            request.initiated_by,
            request.approved_by,
        );

        info!(
            tenant = %record.tenant_id,
            from = %record.from_level,
            to = %record.to_level,
            reason = %record.reason,
            "autonomy level changed"
        );

        self.history
            .write()
            .map_err(|_| AutonomyError::LockError)?
            .entry(request.tenant_id)
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    /// The tenant's transition history, oldest first. Empty when no
    /// transition has been applied through this controller.
    pub fn history(&self, tenant: &TenantId) -> Vec<AutonomyTransition> {
        self.history
            .read()
            .map(|h| h.get(tenant).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

/// Whether `from -> to` is in the transition graph.
fn is_legal_edge(from: AutonomyLevel, to: AutonomyLevel) -> bool {
    if from == to {
        return false;
    }
    if to == AutonomyLevel::Paused {
        return true;
    }
    if from == AutonomyLevel::Paused {
        return true;
    }
    from.promotion_target() == Some(to) || from.demotion_target() == Some(to)
}

/// Promotions into supervised or above need a human approver, and any
/// resume from paused does.
fn needs_approver(from: AutonomyLevel, to: AutonomyLevel) -> bool {
    if from == AutonomyLevel::Paused {
        return true;
    }
    to.rank() >= AutonomyLevel::Supervised.rank()
        && to.rank() > from.rank()
        && to != AutonomyLevel::Paused
}
