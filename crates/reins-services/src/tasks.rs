//! Task store contract: read-only window queries over agent task history.

use std::sync::RwLock;

use async_trait::async_trait;
use reins_types::{Task, TenantId};

use crate::error::ServiceError;

/// Contract for the external task store.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Tasks for the tenant created at or after `since`.
    async fn tasks_since(
        &self,
        tenant: &TenantId,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<Task>, ServiceError>;
}

/// In-memory task store for tests and development.
pub struct InMemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(Vec::new()),
        }
    }

    pub fn insert(&self, task: Task) {
        self.tasks.write().unwrap().push(task);
    }

    pub fn insert_all(&self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.write().unwrap().extend(tasks);
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn tasks_since(
        &self,
        tenant: &TenantId,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<Task>, ServiceError> {
        let tasks = self.tasks.read().unwrap();
        Ok(tasks
            .iter()
            .filter(|t| &t.tenant_id == tenant && t.created_at >= since)
            .cloned()
            .collect())
    }
}
