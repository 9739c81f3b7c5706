//! The governance facade.

use std::sync::Arc;

use reins_autonomy::{
    AutonomyEvaluator, DemotionDecision, MetricsAggregator, PromotionDecision, ThresholdPolicy,
    TransitionController, TransitionRequest,
};
use reins_escalation::{ApprovalCheck, EscalationEngine};
use reins_services::{
    EvaluationService, GenerationService, GuidelinesStore, TaskStore, TenantStore,
};
use reins_shadow::SessionManager;
use reins_types::{
    ActionContext, AutonomyLevel, AutonomyMetrics, AutonomyTransition, CapturedInteraction,
    HumanAction, InteractionKind, MetricsPeriod, SessionConfig, SessionId, ShadowLearning,
    ShadowSession, TenantId, TransitionInitiator,
};
use tracing::info;

use crate::error::GovernorError;

/// External collaborators the governor is wired to.
pub struct GovernorDeps {
    pub tenants: Arc<dyn TenantStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub generation: Arc<dyn GenerationService>,
    pub evaluation: Arc<dyn EvaluationService>,
    pub guidelines: Arc<dyn GuidelinesStore>,
}

/// One object that answers every governance question for a deployment:
/// "may the agent do this", "has this tenant earned more autonomy", and
/// "what is the agent learning while it watches".
pub struct AutonomyGovernor {
    tenants: Arc<dyn TenantStore>,
    escalation: EscalationEngine,
    metrics: MetricsAggregator,
    evaluator: AutonomyEvaluator,
    transitions: TransitionController,
    shadow: SessionManager,
}

impl AutonomyGovernor {
    /// Wire a governor with the default escalation table and rules.
    pub fn new(deps: GovernorDeps, policy: ThresholdPolicy) -> Self {
        Self::with_escalation(deps, policy, EscalationEngine::with_defaults())
    }

    /// Wire a governor with a deployment-specific escalation engine.
    pub fn with_escalation(
        deps: GovernorDeps,
        policy: ThresholdPolicy,
        escalation: EscalationEngine,
    ) -> Self {
        let shadow = SessionManager::new(
            deps.generation.clone(),
            deps.evaluation.clone(),
            deps.guidelines.clone(),
        );
        let evaluator = AutonomyEvaluator::new(
            deps.tenants.clone(),
            MetricsAggregator::new(deps.tasks.clone()),
            Arc::new(shadow.clone()),
            policy,
        );
        Self {
            escalation,
            metrics: MetricsAggregator::new(deps.tasks),
            evaluator,
            transitions: TransitionController::new(deps.tenants.clone()),
            shadow,
            tenants: deps.tenants,
        }
    }

    // ---- escalation ----

    /// Must a human approve this action for this tenant, right now?
    pub async fn requires_approval(
        &self,
        tenant: &TenantId,
        action: &str,
        context: &ActionContext,
    ) -> Result<ApprovalCheck, GovernorError> {
        let record = self.tenants.get(tenant).await?;
        Ok(self.escalation.requires_approval(record.level, action, context))
    }

    // ---- metrics and evaluation ----

    pub async fn metrics(
        &self,
        tenant: &TenantId,
        period: MetricsPeriod,
    ) -> Result<AutonomyMetrics, GovernorError> {
        Ok(self.metrics.calculate_metrics(tenant, period).await?)
    }

    pub async fn evaluate_promotion(
        &self,
        tenant: &TenantId,
    ) -> Result<PromotionDecision, GovernorError> {
        Ok(self.evaluator.evaluate_promotion(tenant).await?)
    }

    pub async fn evaluate_demotion(
        &self,
        tenant: &TenantId,
    ) -> Result<DemotionDecision, GovernorError> {
        Ok(self.evaluator.evaluate_demotion(tenant).await?)
    }

    // ---- transitions ----

    /// Promote the tenant one level, after re-checking eligibility.
    pub async fn promote_tenant(
        &self,
        tenant: &TenantId,
        approved_by: Option<String>,
    ) -> Result<AutonomyTransition, GovernorError> {
        let decision = self.evaluator.evaluate_promotion(tenant).await?;
        let next_level = match (decision.eligible, decision.next_level) {
            (true, Some(level)) => level,
            _ => {
                return Err(GovernorError::NotEligible {
                    blockers: decision.blockers,
                })
            }
        };

        let transition = self
            .transitions
            .transition(TransitionRequest {
                tenant_id: tenant.clone(),
                from_level: decision.current_level,
                to_level: next_level,
                reason: "promotion thresholds met".into(),
                initiated_by: TransitionInitiator::System,
                approved_by,
            })
            .await?;
        Ok(transition)
    }

    /// Demote the tenant if the evaluator says so. `Ok(None)` when no
    /// threshold is breached.
    pub async fn demote_tenant(
        &self,
        tenant: &TenantId,
    ) -> Result<Option<AutonomyTransition>, GovernorError> {
        let decision = self.evaluator.evaluate_demotion(tenant).await?;
        let suggested = match (decision.should_demote, decision.suggested_level) {
            (true, Some(level)) => level,
            _ => return Ok(None),
        };

        info!(tenant = %tenant, reasons = ?decision.reasons, "demoting tenant");
        let transition = self
            .transitions
            .transition(TransitionRequest {
                tenant_id: tenant.clone(),
                from_level: decision.current_level,
                to_level: suggested,
                reason: decision.reasons.join("; "),
                initiated_by: TransitionInitiator::System,
                approved_by: None,
            })
            .await?;
        Ok(Some(transition))
    }

    /// Emergency stop: freeze the tenant at `paused`.
    pub async fn pause_tenant(
        &self,
        tenant: &TenantId,
        operator: &str,
        reason: &str,
    ) -> Result<AutonomyTransition, GovernorError> {
        let record = self.tenants.get(tenant).await?;
        let transition = self
            .transitions
            .transition(TransitionRequest {
                tenant_id: tenant.clone(),
                from_level: record.level,
                to_level: AutonomyLevel::Paused,
                reason: reason.to_string(),
                initiated_by: TransitionInitiator::Operator(operator.to_string()),
                approved_by: None,
            })
            .await?;
        Ok(transition)
    }

    /// Resume a paused tenant at an explicit level. Always human-approved.
    pub async fn resume_tenant(
        &self,
        tenant: &TenantId,
        to_level: AutonomyLevel,
        approved_by: &str,
        reason: &str,
    ) -> Result<AutonomyTransition, GovernorError> {
        let record = self.tenants.get(tenant).await?;
        let transition = self
            .transitions
            .transition(TransitionRequest {
                tenant_id: tenant.clone(),
                from_level: record.level,
                to_level,
                reason: reason.to_string(),
                initiated_by: TransitionInitiator::Operator(approved_by.to_string()),
                approved_by: Some(approved_by.to_string()),
            })
            .await?;
        Ok(transition)
    }

    /// The tenant's transition history, oldest first.
    pub fn transition_history(&self, tenant: &TenantId) -> Vec<AutonomyTransition> {
        self.transitions.history(tenant)
    }

    // ---- shadow mode ----

    pub async fn start_session(
        &self,
        tenant: &TenantId,
        config: SessionConfig,
    ) -> Result<ShadowSession, GovernorError> {
        // Sessions only make sense for registered tenants.
        self.tenants.get(tenant).await?;
        Ok(self.shadow.start_session(tenant, config)?)
    }

    pub fn pause_session(&self, tenant: &TenantId) -> Result<ShadowSession, GovernorError> {
        Ok(self.shadow.pause_session(tenant)?)
    }

    pub fn resume_session(&self, tenant: &TenantId) -> Result<ShadowSession, GovernorError> {
        Ok(self.shadow.resume_session(tenant)?)
    }

    pub async fn end_session(
        &self,
        tenant: &TenantId,
    ) -> Result<(ShadowSession, ShadowLearning), GovernorError> {
        Ok(self.shadow.end_session(tenant).await?)
    }

    pub fn capture_interaction(
        &self,
        tenant: &TenantId,
        kind: InteractionKind,
        context: ActionContext,
        human_action: HumanAction,
    ) -> Result<CapturedInteraction, GovernorError> {
        Ok(self
            .shadow
            .capture_interaction(tenant, kind, context, human_action)?)
    }

    pub fn get_session(&self, session: &SessionId) -> Result<ShadowSession, GovernorError> {
        Ok(self.shadow.get_session(session)?)
    }

    pub fn interactions(&self, session: &SessionId) -> Vec<CapturedInteraction> {
        self.shadow.interactions(session)
    }

    pub fn interactions_for_review(&self, session: &SessionId) -> Vec<CapturedInteraction> {
        self.shadow.interactions_for_review(session)
    }

    pub fn learnings(&self, session: &SessionId) -> Vec<ShadowLearning> {
        self.shadow.learnings(session)
    }
}
