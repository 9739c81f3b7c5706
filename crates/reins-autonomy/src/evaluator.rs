//! Promotion and demotion evaluation.
//!
//! Promotion reports every unmet condition, not just the first, so an
//! operator dashboard can show the full path to the next level. Missing
//! data is conservative in both directions: it blocks promotion and never
//! triggers demotion.

use std::sync::Arc;

use reins_services::{ShadowStatsSource, TenantStore};
use reins_types::{AutonomyLevel, AutonomyMetrics, TenantId};
use tracing::debug;

use crate::error::AutonomyError;
use crate::metrics::MetricsAggregator;
use crate::thresholds::ThresholdPolicy;

/// Outcome of a promotion evaluation.
#[derive(Clone, Debug)]
pub struct PromotionDecision {
    pub tenant_id: TenantId,
    pub current_level: AutonomyLevel,
    /// The level the tenant would move to, when one exists.
    pub next_level: Option<AutonomyLevel>,
    pub eligible: bool,
    /// Every unmet condition, in evaluation order. Empty iff eligible.
    pub blockers: Vec<String>,
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
}

/// Outcome of a demotion evaluation.
#[derive(Clone, Debug)]
pub struct DemotionDecision {
    pub tenant_id: TenantId,
    pub current_level: AutonomyLevel,
    pub should_demote: bool,
    pub suggested_level: Option<AutonomyLevel>,
    /// Every breached threshold. Empty iff `should_demote` is false.
    pub reasons: Vec<String>,
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
}

/// Evaluates tenants against the threshold policy.
///
/// Evaluation is read-only: applying a decision is the transition
/// controller's job, with its own approval and concurrency checks.
pub struct AutonomyEvaluator {
    tenants: Arc<dyn TenantStore>,
    metrics: MetricsAggregator,
    shadow_stats: Arc<dyn ShadowStatsSource>,
    policy: ThresholdPolicy,
}

impl AutonomyEvaluator {
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        metrics: MetricsAggregator,
        shadow_stats: Arc<dyn ShadowStatsSource>,
        policy: ThresholdPolicy,
    ) -> Self {
        Self {
            tenants,
            metrics,
            shadow_stats,
            policy,
        }
    }

    /// Evaluate whether the tenant may move up one level.
    pub async fn evaluate_promotion(
        &self,
        tenant: &TenantId,
    ) -> Result<PromotionDecision, AutonomyError> {
        let record = self.tenants.get(tenant).await?;
        let now = chrono::Utc::now();
        let hours = record.hours_in_level(now);
        let mut blockers = Vec::new();

        let next_level = record.level.promotion_target();
        match record.level {
            AutonomyLevel::Onboarding => {
                let gates = &self.policy.onboarding;
                if hours < gates.min_hours {
                    blockers.push(format!(
                        "only {hours:.0}h in onboarding, need {:.0}h",
                        gates.min_hours
                    ));
                }
            }
            AutonomyLevel::ShadowMode => {
                let gates = &self.policy.shadow;
                if hours < gates.min_hours {
                    blockers.push(format!(
                        "only {hours:.0}h in shadow mode, need {:.0}h",
                        gates.min_hours
                    ));
                }
                match self.shadow_stats.shadow_stats(tenant) {
                    None => {
                        blockers.push("no shadow observation data recorded".into());
                    }
                    Some(stats) => {
                        if stats.total_interactions < gates.min_interactions {
                            blockers.push(format!(
                                "{} interactions captured, need {}",
                                stats.total_interactions, gates.min_interactions
                            ));
                        }
                        if stats.match_rate() < gates.min_match_rate {
                            blockers.push(format!(
                                "match rate {:.2} below required {:.2}",
                                stats.match_rate(),
                                gates.min_match_rate
                            ));
                        }
                    }
                }
            }
            AutonomyLevel::Supervised => {
                let gates = &self.policy.supervised;
                if hours < gates.min_hours {
                    blockers.push(format!(
                        "only {hours:.0}h supervised, need {:.0}h",
                        gates.min_hours
                    ));
                }
                let metrics = self
                    .metrics
                    .calculate_metrics(tenant, self.policy.period())
                    .await?;
                self.check_supervised_gates(&metrics, &mut blockers);
            }
            AutonomyLevel::Autonomous => {
                blockers.push("already at the highest autonomy level".into());
            }
            AutonomyLevel::Paused => {
                blockers.push("tenant is paused; resume explicitly before promotion".into());
            }
        }

        let eligible = next_level.is_some() && blockers.is_empty();
        debug!(
            tenant = %tenant,
            level = %record.level,
            eligible,
            blockers = blockers.len(),
            "promotion evaluated"
        );

        Ok(PromotionDecision {
            tenant_id: tenant.clone(),
            current_level: record.level,
            next_level,
            eligible,
            blockers,
            evaluated_at: now,
        })
    }

    fn check_supervised_gates(&self, metrics: &AutonomyMetrics, blockers: &mut Vec<String>) {
        let gates = &self.policy.supervised;
        if metrics.approved_tasks < gates.min_approvals {
            blockers.push(format!(
                "{} approved tasks in window, need {}",
                metrics.approved_tasks, gates.min_approvals
            ));
        }
        if metrics.approval_rate < gates.min_approval_rate {
            blockers.push(format!(
                "approval rate {:.2} below required {:.2}",
                metrics.approval_rate, gates.min_approval_rate
            ));
        }
        if metrics.error_rate > gates.max_error_rate {
            blockers.push(format!(
                "error rate {:.2} above allowed {:.2}",
                metrics.error_rate, gates.max_error_rate
            ));
        }
        if metrics.response_rate < gates.min_response_rate {
            blockers.push(format!(
                "response rate {:.2} below required {:.2}",
                metrics.response_rate, gates.min_response_rate
            ));
        }
    }

    /// Evaluate whether the tenant should be moved down one level.
    ///
    /// Only supervised and autonomous tenants can breach; everything else
    /// yields a no-demotion decision. An empty metrics window triggers no
    /// demotion.
    pub async fn evaluate_demotion(
        &self,
        tenant: &TenantId,
    ) -> Result<DemotionDecision, AutonomyError> {
        let record = self.tenants.get(tenant).await?;
        let now = chrono::Utc::now();
        let suggested_level = record.level.demotion_target();

        let mut reasons = Vec::new();
        if suggested_level.is_some() {
            let metrics = self
                .metrics
                .calculate_metrics(tenant, self.policy.period())
                .await?;
            if metrics.has_data() {
                let gates = &self.policy.demotion;
                if metrics.error_rate > gates.max_error_rate {
                    reasons.push(format!(
                        "error rate {:.2} above allowed {:.2}",
                        metrics.error_rate, gates.max_error_rate
                    ));
                }
                if metrics.rejection_rate > gates.max_rejection_rate {
                    reasons.push(format!(
                        "rejection rate {:.2} above allowed {:.2}",
                        metrics.rejection_rate, gates.max_rejection_rate
                    ));
                }
                if metrics.complaints > gates.max_complaints {
                    reasons.push(format!(
                        "{} complaints in window, at most {} tolerated",
                        metrics.complaints, gates.max_complaints
                    ));
                }
                if metrics.messages_sent > 0 && metrics.response_rate < gates.min_response_rate {
                    reasons.push(format!(
                        "response rate {:.2} below required {:.2}",
                        metrics.response_rate, gates.min_response_rate
                    ));
                }
            }
        }

        let should_demote = !reasons.is_empty();
        debug!(
            tenant = %tenant,
            level = %record.level,
            should_demote,
            "demotion evaluated"
        );

        Ok(DemotionDecision {
            tenant_id: tenant.clone(),
            current_level: record.level,
            should_demote,
            suggested_level: if should_demote { suggested_level } else { None },
            reasons,
            evaluated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reins_services::{FixedShadowStats, InMemoryTaskStore, InMemoryTenantStore};
    use reins_types::{SessionStats, Task, TaskKind, TaskStatus};

    struct Fixture {
        tasks: Arc<InMemoryTaskStore>,
        stats: Arc<FixedShadowStats>,
        evaluator: AutonomyEvaluator,
        tenant: TenantId,
    }

    fn fixture(level: AutonomyLevel, hours_in_level: i64) -> Fixture {
        let tenants = Arc::new(InMemoryTenantStore::new());
        let tasks = Arc::new(InMemoryTaskStore::new());
        let stats = Arc::new(FixedShadowStats::new());
        let tenant = TenantId::new("acme");

        tenants.register(tenant.clone(), level);
        tenants.set_level_since(
            &tenant,
            chrono::Utc::now() - chrono::Duration::hours(hours_in_level),
        );

        let evaluator = AutonomyEvaluator::new(
            tenants.clone(),
            MetricsAggregator::new(tasks.clone()),
            stats.clone(),
            ThresholdPolicy::default(),
        );

        Fixture {
            tasks,
            stats,
            evaluator,
            tenant,
        }
    }

    fn shadow_stats(total: usize, compared: usize, matched: usize) -> SessionStats {
        SessionStats {
            total_interactions: total,
            message_count: total,
            decision_count: 0,
            compared_count: compared,
            match_count: matched,
        }
    }

    #[tokio::test]
    async fn shadow_tenant_meeting_all_gates_is_eligible() {
        let f = fixture(AutonomyLevel::ShadowMode, 200);
        f.stats.set(f.tenant.clone(), shadow_stats(120, 100, 75));

        let decision = f.evaluator.evaluate_promotion(&f.tenant).await.unwrap();
        assert!(decision.eligible);
        assert!(decision.blockers.is_empty());
        assert_eq!(decision.next_level, Some(AutonomyLevel::Supervised));
    }

    #[tokio::test]
    async fn low_match_rate_is_the_only_blocker() {
        let f = fixture(AutonomyLevel::ShadowMode, 200);
        f.stats.set(f.tenant.clone(), shadow_stats(120, 100, 50));

        let decision = f.evaluator.evaluate_promotion(&f.tenant).await.unwrap();
        assert!(!decision.eligible);
        assert_eq!(decision.blockers.len(), 1);
        assert!(decision.blockers[0].contains("match rate"));
    }

    #[tokio::test]
    async fn every_unmet_gate_is_reported() {
        // Fresh shadow tenant with no observation data at all.
        let f = fixture(AutonomyLevel::ShadowMode, 10);

        let decision = f.evaluator.evaluate_promotion(&f.tenant).await.unwrap();
        assert!(!decision.eligible);
        assert_eq!(decision.blockers.len(), 2);
        assert!(decision.blockers.iter().any(|b| b.contains("shadow mode")));
        assert!(decision
            .blockers
            .iter()
            .any(|b| b.contains("no shadow observation data")));
    }

    #[tokio::test]
    async fn supervised_promotion_checks_task_metrics() {
        let f = fixture(AutonomyLevel::Supervised, 400);
        // 60 approved messages with responses, nothing failed.
        for _ in 0..60 {
            f.tasks.insert(
                Task::new(f.tenant.clone(), TaskKind::Message, TaskStatus::Completed)
                    .with_response(true),
            );
        }

        let decision = f.evaluator.evaluate_promotion(&f.tenant).await.unwrap();
        assert!(decision.eligible, "blockers: {:?}", decision.blockers);
        assert_eq!(decision.next_level, Some(AutonomyLevel::Autonomous));
    }

    #[tokio::test]
    async fn autonomous_tenant_is_never_promotion_eligible() {
        let f = fixture(AutonomyLevel::Autonomous, 1000);
        let decision = f.evaluator.evaluate_promotion(&f.tenant).await.unwrap();
        assert!(!decision.eligible);
        assert_eq!(decision.next_level, None);
    }

    #[tokio::test]
    async fn high_error_rate_demotes_autonomous_to_supervised() {
        let f = fixture(AutonomyLevel::Autonomous, 500);
        // 8 completed, 2 failed: weekly error rate 0.2 > 0.15.
        for _ in 0..8 {
            f.tasks.insert(Task::new(
                f.tenant.clone(),
                TaskKind::Decision,
                TaskStatus::Completed,
            ));
        }
        for _ in 0..2 {
            f.tasks.insert(Task::new(
                f.tenant.clone(),
                TaskKind::Decision,
                TaskStatus::Failed,
            ));
        }

        let decision = f.evaluator.evaluate_demotion(&f.tenant).await.unwrap();
        assert!(decision.should_demote);
        assert_eq!(decision.suggested_level, Some(AutonomyLevel::Supervised));
        assert_eq!(decision.reasons.len(), 1);
        assert!(decision.reasons[0].contains("error rate"));
    }

    #[tokio::test]
    async fn empty_window_never_demotes() {
        let f = fixture(AutonomyLevel::Autonomous, 500);
        let decision = f.evaluator.evaluate_demotion(&f.tenant).await.unwrap();
        assert!(!decision.should_demote);
        assert!(decision.reasons.is_empty());
        assert_eq!(decision.suggested_level, None);
    }

    #[tokio::test]
    async fn shadow_tenants_are_not_demotion_candidates() {
        let f = fixture(AutonomyLevel::ShadowMode, 100);
        f.tasks.insert(Task::new(
            f.tenant.clone(),
            TaskKind::Message,
            TaskStatus::Failed,
        ));

        let decision = f.evaluator.evaluate_demotion(&f.tenant).await.unwrap();
        assert!(!decision.should_demote);
    }

    #[tokio::test]
    async fn unknown_tenant_is_an_error() {
        let f = fixture(AutonomyLevel::ShadowMode, 100);
        let err = f
            .evaluator
            .evaluate_promotion(&TenantId::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, AutonomyError::UnknownTenant(_)));
    }
}
