//! Shadow statistics source: how the promotion evaluator reads capture
//! counts and match rates without depending on the session manager.

use std::collections::HashMap;
use std::sync::RwLock;

use reins_types::{SessionStats, TenantId};

/// Read-only view of a tenant's shadow-observation statistics.
///
/// Returns `None` when the tenant has never run a shadow session; the
/// evaluator treats that as a blocker, not an error.
pub trait ShadowStatsSource: Send + Sync {
    fn shadow_stats(&self, tenant: &TenantId) -> Option<SessionStats>;
}

/// Fixed stats keyed by tenant, for evaluator tests.
pub struct FixedShadowStats {
    stats: RwLock<HashMap<TenantId, SessionStats>>,
}

impl FixedShadowStats {
    pub fn new() -> Self {
        Self {
            stats: RwLock::new(HashMap::new()),
        }
    }

    pub fn set(&self, tenant: TenantId, stats: SessionStats) {
        self.stats.write().unwrap().insert(tenant, stats);
    }
}

impl Default for FixedShadowStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadowStatsSource for FixedShadowStats {
    fn shadow_stats(&self, tenant: &TenantId) -> Option<SessionStats> {
        self.stats.read().unwrap().get(tenant).copied()
    }
}
