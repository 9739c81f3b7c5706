//! Metrics aggregation over the external task store.
//!
//! Snapshots are computed on demand from the window `now - period .. now`
//! and never persisted. A window with no tasks yields zero totals and zero
//! rates, not an error.

use std::sync::Arc;

use reins_services::TaskStore;
use reins_types::{safe_rate, AutonomyMetrics, MetricsPeriod, Task, TaskKind, TaskStatus, TenantId};

use crate::error::AutonomyError;

/// Computes windowed performance snapshots for a tenant.
pub struct MetricsAggregator {
    tasks: Arc<dyn TaskStore>,
}

impl MetricsAggregator {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// Snapshot of the tenant's performance over the trailing window.
    pub async fn calculate_metrics(
        &self,
        tenant: &TenantId,
        period: MetricsPeriod,
    ) -> Result<AutonomyMetrics, AutonomyError> {
        let since = chrono::Utc::now() - period.window();
        let tasks = self.tasks.tasks_since(tenant, since).await?;
        Ok(aggregate(period, &tasks))
    }
}

fn aggregate(period: MetricsPeriod, tasks: &[Task]) -> AutonomyMetrics {
    if tasks.is_empty() {
        return AutonomyMetrics::empty(period);
    }

    let total = tasks.len();
    let approved = count(tasks, |t| t.status == TaskStatus::Completed);
    let rejected = count(tasks, |t| t.status == TaskStatus::Rejected);
    let failed = count(tasks, |t| t.status == TaskStatus::Failed);
    let escalated = count(tasks, |t| t.escalation_reason.is_some());
    let complaints = count(tasks, |t| t.complaint);
    let messages_sent = count(tasks, |t| t.kind == TaskKind::Message);
    let responses_received = count(tasks, |t| t.response_received == Some(true));

    let latencies: Vec<f64> = tasks
        .iter()
        .filter_map(|t| {
            t.approved_at
                .map(|approved_at| (approved_at - t.created_at).num_seconds().max(0) as f64)
        })
        .collect();
    let mean_approval_latency_secs = if latencies.is_empty() {
        None
    } else {
        Some(latencies.iter().sum::<f64>() / latencies.len() as f64)
    };

    AutonomyMetrics {
        period: Some(period),
        total_tasks: total,
        approved_tasks: approved,
        rejected_tasks: rejected,
        escalated_tasks: escalated,
        failed_tasks: failed,
        complaints,
        messages_sent,
        responses_received,
        mean_approval_latency_secs,
        approval_rate: safe_rate(approved, total),
        error_rate: safe_rate(failed, total),
        escalation_rate: safe_rate(escalated, total),
        rejection_rate: safe_rate(rejected, approved + rejected),
        response_rate: safe_rate(responses_received, messages_sent),
    }
}

fn count(tasks: &[Task], predicate: impl Fn(&Task) -> bool) -> usize {
    tasks.iter().filter(|t| predicate(t)).count()
}
