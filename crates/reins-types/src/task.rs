//! Task records as surfaced by the external task store.
//!
//! The engine never owns task state; it reads a window of tasks to compute
//! metrics. Only the fields the aggregator needs are modeled here.

use crate::TenantId;
use serde::{Deserialize, Serialize};

/// Coarse task classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Message,
    Decision,
    Scheduling,
    Other,
}

/// Terminal (or pending) state of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Approved and carried out.
    Completed,
    /// Rejected by a human reviewer.
    Rejected,
    /// Failed in execution.
    Failed,
    /// Still awaiting review or execution.
    Pending,
}

/// One unit of agent work, as read back from the task store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub tenant_id: TenantId,
    pub kind: TaskKind,
    pub status: TaskStatus,
    /// Set when the task was escalated to a human, with the rule description.
    pub escalation_reason: Option<String>,
    /// A complaint was filed against this task's outcome.
    pub complaint: bool,
    /// For outreach tasks: whether the recipient responded. `None` when
    /// response tracking does not apply.
    pub response_received: Option<bool>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When a human approved the task, if approval happened.
    pub approved_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Task {
    pub fn new(tenant_id: TenantId, kind: TaskKind, status: TaskStatus) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id,
            kind,
            status,
            escalation_reason: None,
            complaint: false,
            response_received: None,
            created_at: chrono::Utc::now(),
            approved_at: None,
        }
    }

    pub fn escalated(mut self, reason: impl Into<String>) -> Self {
        self.escalation_reason = Some(reason.into());
        self
    }

    pub fn with_complaint(mut self) -> Self {
        self.complaint = true;
        self
    }

    pub fn with_response(mut self, responded: bool) -> Self {
        self.response_received = Some(responded);
        self
    }

    pub fn created_at(mut self, at: chrono::DateTime<chrono::Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn approved_at(mut self, at: chrono::DateTime<chrono::Utc>) -> Self {
        self.approved_at = Some(at);
        self
    }
}
