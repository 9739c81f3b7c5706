//! Tenant store contract: the authoritative record of each tenant's level.
//!
//! Level writes go through compare-and-set so two competing
//! promotion/demotion calls cannot both succeed against a stale read.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use reins_types::{AutonomyLevel, TenantId, TenantRecord};

use crate::error::ServiceError;

/// Contract for the external tenant store.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// The tenant's current governance record.
    async fn get(&self, tenant: &TenantId) -> Result<TenantRecord, ServiceError>;

    /// Atomically move the tenant from `expected` to `new`.
    ///
    /// Fails with [`ServiceError::Conflict`] when the stored level no longer
    /// matches `expected`. On success the store stamps `level_since` with the
    /// write time.
    async fn compare_and_set(
        &self,
        tenant: &TenantId,
        expected: AutonomyLevel,
        new: AutonomyLevel,
    ) -> Result<(), ServiceError>;
}

/// In-memory tenant store for tests and development.
pub struct InMemoryTenantStore {
    records: RwLock<HashMap<TenantId, TenantRecord>>,
}

impl InMemoryTenantStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Register a tenant at the given starting level.
    pub fn register(&self, tenant: TenantId, level: AutonomyLevel) {
        let record = TenantRecord::new(tenant.clone(), level);
        self.records.write().unwrap().insert(tenant, record);
    }

    /// Backdate `level_since` so tests can simulate time spent in a level.
    pub fn set_level_since(&self, tenant: &TenantId, since: chrono::DateTime<chrono::Utc>) {
        if let Some(record) = self.records.write().unwrap().get_mut(tenant) {
            record.level_since = since;
        }
    }
}

impl Default for InMemoryTenantStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn get(&self, tenant: &TenantId) -> Result<TenantRecord, ServiceError> {
        self.records
            .read()
            .unwrap()
            .get(tenant)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownTenant(tenant.to_string()))
    }

    async fn compare_and_set(
        &self,
        tenant: &TenantId,
        expected: AutonomyLevel,
        new: AutonomyLevel,
    ) -> Result<(), ServiceError> {
        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(tenant)
            .ok_or_else(|| ServiceError::UnknownTenant(tenant.to_string()))?;

        if record.level != expected {
            return Err(ServiceError::Conflict {
                expected,
                actual: record.level,
            });
        }

        record.level = new;
        record.level_since = chrono::Utc::now();
        Ok(())
    }
}
