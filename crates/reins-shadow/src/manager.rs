//! Shadow session lifecycle and the capture pipeline.
//!
//! One live (active or paused) session per tenant. Capture appends the
//! human action and updates counters synchronously, then hands the
//! interaction to a detached task that generates the agent's alternative,
//! scores it, and periodically runs a learning pass. No lock is held
//! across an await.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use reins_services::{
    EvaluationService, GenerationPurpose, GenerationRequest, GenerationService, GuidelinesStore,
    ShadowStatsSource,
};
use reins_types::{
    ActionContext, AgentAlternative, CapturedInteraction, HumanAction, InteractionId,
    InteractionKind, SessionConfig, SessionId, SessionStats, SessionStatus, ShadowLearning,
    ShadowSession, TenantId,
};
use tracing::{info, warn};

use crate::comparator::Comparator;
use crate::error::ShadowError;
use crate::learning::LearningAggregator;

/// Compared interactions scoring below this go to the human review queue.
const REVIEW_SIMILARITY: f64 = 0.5;

struct Inner {
    sessions: RwLock<HashMap<SessionId, ShadowSession>>,
    /// The tenant's live session (active or paused), at most one.
    live: RwLock<HashMap<TenantId, SessionId>>,
    interactions: RwLock<HashMap<SessionId, Vec<CapturedInteraction>>>,
    /// Interactions with a pipeline run in flight; guards double generation.
    in_flight: Mutex<HashSet<InteractionId>>,
    learnings: RwLock<HashMap<SessionId, Vec<ShadowLearning>>>,
    generation: Arc<dyn GenerationService>,
    comparator: Comparator,
    aggregator: LearningAggregator,
}

/// Owns all shadow sessions and their captured interactions.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        evaluation: Arc<dyn EvaluationService>,
        guidelines: Arc<dyn GuidelinesStore>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                sessions: RwLock::new(HashMap::new()),
                live: RwLock::new(HashMap::new()),
                interactions: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashSet::new()),
                learnings: RwLock::new(HashMap::new()),
                generation: generation.clone(),
                comparator: Comparator::new(evaluation),
                aggregator: LearningAggregator::new(generation, guidelines),
            }),
        }
    }

    /// Begin observing a tenant. Fails if a live session already exists.
    pub fn start_session(
        &self,
        tenant: &TenantId,
        config: SessionConfig,
    ) -> Result<ShadowSession, ShadowError> {
        let mut live = self.inner.live.write().map_err(|_| ShadowError::LockError)?;
        if live.contains_key(tenant) {
            return Err(ShadowError::SessionAlreadyActive(tenant.to_string()));
        }

        let session = ShadowSession::new(tenant.clone(), config);
        live.insert(tenant.clone(), session.id.clone());
        self.inner
            .sessions
            .write()
            .map_err(|_| ShadowError::LockError)?
            .insert(session.id.clone(), session.clone());

        info!(tenant = %tenant, session = %session.id, "shadow session started");
        Ok(session)
    }

    /// Suspend capture without ending the session.
    pub fn pause_session(&self, tenant: &TenantId) -> Result<ShadowSession, ShadowError> {
        self.set_status(tenant, SessionStatus::Active, SessionStatus::Paused)
    }

    /// Resume a paused session.
    pub fn resume_session(&self, tenant: &TenantId) -> Result<ShadowSession, ShadowError> {
        self.set_status(tenant, SessionStatus::Paused, SessionStatus::Active)
    }

    fn set_status(
        &self,
        tenant: &TenantId,
        needed: SessionStatus,
        new: SessionStatus,
    ) -> Result<ShadowSession, ShadowError> {
        let session_id = self.live_session_id(tenant)?;
        let mut sessions = self
            .inner
            .sessions
            .write()
            .map_err(|_| ShadowError::LockError)?;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| ShadowError::SessionNotFound(session_id.to_string()))?;
        if session.status != needed {
            return Err(ShadowError::InvalidState {
                needed,
                actual: session.status,
            });
        }
        session.status = new;
        Ok(session.clone())
    }

    /// End the tenant's live session. Runs one final learning pass over
    /// everything compared so far and returns it with the final snapshot.
    pub async fn end_session(
        &self,
        tenant: &TenantId,
    ) -> Result<(ShadowSession, ShadowLearning), ShadowError> {
        let session_id = self.live_session_id(tenant)?;

        let session = {
            let mut live = self.inner.live.write().map_err(|_| ShadowError::LockError)?;
            let mut sessions = self
                .inner
                .sessions
                .write()
                .map_err(|_| ShadowError::LockError)?;
            let session = sessions
                .get_mut(&session_id)
                .ok_or_else(|| ShadowError::SessionNotFound(session_id.to_string()))?;
            session.status = SessionStatus::Completed;
            session.ended_at = Some(chrono::Utc::now());
            live.remove(tenant);
            session.clone()
        };

        let snapshot = self.interactions(&session.id);
        let learning = self.inner.aggregator.run(&session.id, &snapshot).await;
        self.record_learning(&session.id, learning.clone());

        info!(
            tenant = %tenant,
            session = %session.id,
            interactions = session.stats.total_interactions,
            match_rate = session.stats.match_rate(),
            "shadow session ended"
        );
        Ok((session, learning))
    }

    /// Record what a human just did. Cheap and synchronous; the agent's
    /// alternative and the comparison land later via a detached task.
    pub fn capture_interaction(
        &self,
        tenant: &TenantId,
        kind: InteractionKind,
        context: ActionContext,
        human_action: HumanAction,
    ) -> Result<CapturedInteraction, ShadowError> {
        let session_id = self.live_session_id(tenant)?;

        let interaction = {
            let mut sessions = self
                .inner
                .sessions
                .write()
                .map_err(|_| ShadowError::LockError)?;
            let session = sessions
                .get_mut(&session_id)
                .ok_or_else(|| ShadowError::SessionNotFound(session_id.to_string()))?;
            if session.status != SessionStatus::Active {
                return Err(ShadowError::InvalidState {
                    needed: SessionStatus::Active,
                    actual: session.status,
                });
            }
            if !session.config.captures(kind) {
                return Err(ShadowError::KindNotCaptured(kind));
            }

            session.stats.total_interactions += 1;
            match kind {
                InteractionKind::Message => session.stats.message_count += 1,
                InteractionKind::Decision => session.stats.decision_count += 1,
            }

            CapturedInteraction::new(session_id.clone(), kind, context, human_action)
        };

        self.inner
            .interactions
            .write()
            .map_err(|_| ShadowError::LockError)?
            .entry(session_id)
            .or_default()
            .push(interaction.clone());

        let manager = self.clone();
        let interaction_id = interaction.id.clone();
        tokio::spawn(async move {
            manager.run_pipeline(interaction_id).await;
        });

        Ok(interaction)
    }

    /// The session record, live or completed.
    pub fn get_session(&self, session: &SessionId) -> Result<ShadowSession, ShadowError> {
        self.inner
            .sessions
            .read()
            .map_err(|_| ShadowError::LockError)?
            .get(session)
            .cloned()
            .ok_or_else(|| ShadowError::SessionNotFound(session.to_string()))
    }

    /// The tenant's live session, if any.
    pub fn live_session(&self, tenant: &TenantId) -> Option<ShadowSession> {
        let session_id = self.live_session_id(tenant).ok()?;
        self.get_session(&session_id).ok()
    }

    /// All captured interactions for a session, capture order.
    pub fn interactions(&self, session: &SessionId) -> Vec<CapturedInteraction> {
        self.inner
            .interactions
            .read()
            .map(|m| m.get(session).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Compared interactions where agent and human diverged badly.
    pub fn interactions_for_review(&self, session: &SessionId) -> Vec<CapturedInteraction> {
        self.interactions(session)
            .into_iter()
            .filter(|i| {
                i.comparison
                    .as_ref()
                    .is_some_and(|c| c.similarity < REVIEW_SIMILARITY)
            })
            .collect()
    }

    /// Learning passes recorded for a session, oldest first.
    pub fn learnings(&self, session: &SessionId) -> Vec<ShadowLearning> {
        self.inner
            .learnings
            .read()
            .map(|m| m.get(session).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn live_session_id(&self, tenant: &TenantId) -> Result<SessionId, ShadowError> {
        self.inner
            .live
            .read()
            .map_err(|_| ShadowError::LockError)?
            .get(tenant)
            .cloned()
            .ok_or_else(|| ShadowError::NoActiveSession(tenant.to_string()))
    }

    fn record_learning(&self, session: &SessionId, learning: ShadowLearning) {
        if let Ok(mut learnings) = self.inner.learnings.write() {
            learnings.entry(session.clone()).or_default().push(learning);
        }
    }

    /// The background half of capture: generate the agent's alternative,
    /// score it, update counters, and run a learning pass every
    /// `learning_batch_size` comparisons. Failures are logged and leave the
    /// interaction pending.
    async fn run_pipeline(&self, interaction_id: InteractionId) {
        {
            let mut in_flight = match self.inner.in_flight.lock() {
                Ok(guard) => guard,
                Err(_) => return,
            };
            if !in_flight.insert(interaction_id.clone()) {
                return;
            }
        }

        self.pipeline_inner(&interaction_id).await;

        if let Ok(mut in_flight) = self.inner.in_flight.lock() {
            in_flight.remove(&interaction_id);
        }
    }

    async fn pipeline_inner(&self, interaction_id: &InteractionId) {
        let (interaction, config) = match self.snapshot_for_pipeline(interaction_id) {
            Some(pair) => pair,
            None => return,
        };
        if interaction.is_compared() {
            return;
        }

        let request = GenerationRequest::new(
            GenerationPurpose::AlternativeAction,
            format!(
                "A {} is needed for task '{}'. Situation: {}. Draft what the agent would do, \
                 independently of any human action.",
                interaction.kind, interaction.context.task_type, interaction.context.content
            ),
        )
        .with_context("task_type", interaction.context.task_type.clone())
        .with_context("kind", interaction.kind.to_string());

        let generated = match self.inner.generation.generate(&request).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    interaction = %interaction_id,
                    error = %e,
                    "alternative generation failed, interaction stays pending"
                );
                return;
            }
        };

        let alternative = AgentAlternative {
            content: generated.content,
            confidence: generated.confidence,
            reasoning: generated.reasoning,
            generated_at: chrono::Utc::now(),
        };
        let comparison = self
            .inner
            .comparator
            .compare(
                &interaction.human_action.content,
                &alternative.content,
                interaction.kind,
                config.comparison_threshold,
            )
            .await;

        let compared_count = match self.apply_comparison(
            &interaction.session_id,
            interaction_id,
            alternative,
            comparison,
        ) {
            Some(count) => count,
            None => return,
        };

        if config.learning_batch_size > 0 && compared_count % config.learning_batch_size == 0 {
            // A completed session already got its final pass at end time.
            let still_running = self
                .get_session(&interaction.session_id)
                .map(|s| !s.is_terminal())
                .unwrap_or(false);
            if !still_running {
                return;
            }
            let snapshot = self.interactions(&interaction.session_id);
            let learning = self
                .inner
                .aggregator
                .run(&interaction.session_id, &snapshot)
                .await;
            self.record_learning(&interaction.session_id, learning);
        }
    }

    fn snapshot_for_pipeline(
        &self,
        interaction_id: &InteractionId,
    ) -> Option<(CapturedInteraction, SessionConfig)> {
        let interactions = self.inner.interactions.read().ok()?;
        let interaction = interactions
            .values()
            .flatten()
            .find(|i| &i.id == interaction_id)?
            .clone();
        drop(interactions);

        let sessions = self.inner.sessions.read().ok()?;
        let config = sessions.get(&interaction.session_id)?.config.clone();
        Some((interaction, config))
    }

    /// Write the pipeline result back and bump session counters. Returns the
    /// new compared count.
    fn apply_comparison(
        &self,
        session_id: &SessionId,
        interaction_id: &InteractionId,
        alternative: AgentAlternative,
        comparison: reins_types::ComparisonResult,
    ) -> Option<usize> {
        let is_match = comparison.is_match;
        {
            let mut interactions = self.inner.interactions.write().ok()?;
            let interaction = interactions
                .get_mut(session_id)?
                .iter_mut()
                .find(|i| &i.id == interaction_id)?;
            interaction.agent_alternative = Some(alternative);
            interaction.comparison = Some(comparison);
        }

        let mut sessions = self.inner.sessions.write().ok()?;
        let session = sessions.get_mut(session_id)?;
        session.stats.compared_count += 1;
        if is_match {
            session.stats.match_count += 1;
        }
        Some(session.stats.compared_count)
    }
}

impl ShadowStatsSource for SessionManager {
    /// Aggregate observation evidence across all of the tenant's sessions,
    /// completed ones included. `None` until a session has existed.
    fn shadow_stats(&self, tenant: &TenantId) -> Option<SessionStats> {
        let sessions = self.inner.sessions.read().ok()?;
        let mut total = SessionStats::default();
        let mut seen = false;
        for session in sessions.values().filter(|s| &s.tenant_id == tenant) {
            seen = true;
            total.total_interactions += session.stats.total_interactions;
            total.message_count += session.stats.message_count;
            total.decision_count += session.stats.decision_count;
            total.compared_count += session.stats.compared_count;
            total.match_count += session.stats.match_count;
        }
        seen.then_some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reins_services::{
        InMemoryGuidelinesStore, SimulatedEvaluationService, SimulatedGenerationService,
    };
    use reins_types::GuidelineUpdate;

    fn manager_with(
        generation: SimulatedGenerationService,
        evaluation: SimulatedEvaluationService,
    ) -> (SessionManager, Arc<InMemoryGuidelinesStore>) {
        let guidelines = Arc::new(InMemoryGuidelinesStore::new());
        let manager = SessionManager::new(
            Arc::new(generation),
            Arc::new(evaluation),
            guidelines.clone(),
        );
        (manager, guidelines)
    }

    fn capture(manager: &SessionManager, tenant: &TenantId) -> CapturedInteraction {
        manager
            .capture_interaction(
                tenant,
                InteractionKind::Message,
                ActionContext::new("outreach", "candidate with systems background"),
                HumanAction::new("Hi! Your storage-engine work caught my eye."),
            )
            .unwrap()
    }

    async fn wait_until(mut check: impl FnMut() -> bool) {
        for _ in 0..400 {
            if check() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    fn proposal_payload() -> String {
        serde_json::to_string(&vec![GuidelineUpdate {
            update_type: "tone".into(),
            path: "messaging/outreach".into(),
            reason: "agent register too formal".into(),
            suggested_change: "Open conversationally".into(),
        }])
        .unwrap()
    }

    #[tokio::test]
    async fn one_live_session_per_tenant() {
        let (manager, _) = manager_with(
            SimulatedGenerationService::always("draft"),
            SimulatedEvaluationService::with_similarity(0.9),
        );
        let tenant = TenantId::new("acme");

        manager.start_session(&tenant, SessionConfig::default()).unwrap();
        let err = manager
            .start_session(&tenant, SessionConfig::default())
            .unwrap_err();
        assert!(matches!(err, ShadowError::SessionAlreadyActive(_)));

        // Ending frees the slot.
        manager.end_session(&tenant).await.unwrap();
        manager.start_session(&tenant, SessionConfig::default()).unwrap();
    }

    #[tokio::test]
    async fn paused_session_rejects_capture_until_resumed() {
        let (manager, _) = manager_with(
            SimulatedGenerationService::always("draft"),
            SimulatedEvaluationService::with_similarity(0.9),
        );
        let tenant = TenantId::new("acme");
        manager.start_session(&tenant, SessionConfig::default()).unwrap();
        manager.pause_session(&tenant).unwrap();

        let err = manager
            .capture_interaction(
                &tenant,
                InteractionKind::Message,
                ActionContext::new("outreach", "ctx"),
                HumanAction::new("hello"),
            )
            .unwrap_err();
        assert!(matches!(err, ShadowError::InvalidState { .. }));

        manager.resume_session(&tenant).unwrap();
        capture(&manager, &tenant);
    }

    #[tokio::test]
    async fn capture_kind_allow_list_is_enforced() {
        let (manager, _) = manager_with(
            SimulatedGenerationService::always("draft"),
            SimulatedEvaluationService::with_similarity(0.9),
        );
        let tenant = TenantId::new("acme");
        let config = SessionConfig {
            capture_kinds: vec![InteractionKind::Message],
            ..SessionConfig::default()
        };
        manager.start_session(&tenant, config).unwrap();

        let err = manager
            .capture_interaction(
                &tenant,
                InteractionKind::Decision,
                ActionContext::new("screening", "ctx"),
                HumanAction::new("advance to onsite"),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ShadowError::KindNotCaptured(InteractionKind::Decision)
        ));
    }

    #[tokio::test]
    async fn pipeline_fills_in_alternative_and_comparison() {
        let (manager, _) = manager_with(
            SimulatedGenerationService::always("Dear candidate, regarding a role."),
            SimulatedEvaluationService::with_similarity(0.9),
        );
        let tenant = TenantId::new("acme");
        let session = manager.start_session(&tenant, SessionConfig::default()).unwrap();
        let interaction = capture(&manager, &tenant);
        assert!(!interaction.is_compared());

        let m = manager.clone();
        let sid = session.id.clone();
        wait_until(move || m.interactions(&sid).iter().all(|i| i.is_compared())).await;

        let stored = &manager.interactions(&session.id)[0];
        assert!(stored.comparison.as_ref().unwrap().is_match);

        let stats = manager.get_session(&session.id).unwrap().stats;
        assert_eq!(stats.total_interactions, 1);
        assert_eq!(stats.compared_count, 1);
        assert_eq!(stats.match_count, 1);
    }

    #[tokio::test]
    async fn generation_failure_leaves_interaction_pending() {
        let (manager, _) = manager_with(
            SimulatedGenerationService::failing(),
            SimulatedEvaluationService::with_similarity(0.9),
        );
        let tenant = TenantId::new("acme");
        let session = manager.start_session(&tenant, SessionConfig::default()).unwrap();
        capture(&manager, &tenant);

        // Give the detached task time to fail.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let stored = &manager.interactions(&session.id)[0];
        assert!(!stored.is_compared());
        assert_eq!(manager.get_session(&session.id).unwrap().stats.compared_count, 0);
    }

    #[tokio::test]
    async fn evaluation_failure_records_fallback_comparison() {
        let (manager, _) = manager_with(
            SimulatedGenerationService::always("draft"),
            SimulatedEvaluationService::failing(),
        );
        let tenant = TenantId::new("acme");
        let session = manager.start_session(&tenant, SessionConfig::default()).unwrap();
        capture(&manager, &tenant);

        let m = manager.clone();
        let sid = session.id.clone();
        wait_until(move || m.interactions(&sid).iter().all(|i| i.is_compared())).await;

        let stored = &manager.interactions(&session.id)[0];
        let comparison = stored.comparison.as_ref().unwrap();
        assert_eq!(comparison.similarity, 0.5);
        assert!(!comparison.is_match);
        assert_eq!(manager.get_session(&session.id).unwrap().stats.match_count, 0);
    }

    #[tokio::test]
    async fn learning_runs_every_batch_and_submits_proposals() {
        let config = SessionConfig {
            learning_batch_size: 2,
            ..SessionConfig::default()
        };
        let (manager, guidelines) = manager_with(
            SimulatedGenerationService::always(proposal_payload()),
            SimulatedEvaluationService::with_learnings(
                0.4,
                vec!["agent tone too formal".into()],
            ),
        );
        let tenant = TenantId::new("acme");
        let session = manager.start_session(&tenant, config).unwrap();

        capture(&manager, &tenant);
        capture(&manager, &tenant);

        let m = manager.clone();
        let sid = session.id.clone();
        wait_until(move || !m.learnings(&sid).is_empty()).await;

        let learnings = manager.learnings(&session.id);
        assert!(learnings[0].has_patterns());
        assert!(!guidelines.for_session(&session.id).is_empty());
    }

    #[tokio::test]
    async fn low_similarity_interactions_queue_for_review() {
        let (manager, _) = manager_with(
            SimulatedGenerationService::always("draft"),
            SimulatedEvaluationService::with_similarity(0.3),
        );
        let tenant = TenantId::new("acme");
        let session = manager.start_session(&tenant, SessionConfig::default()).unwrap();
        capture(&manager, &tenant);

        let m = manager.clone();
        let sid = session.id.clone();
        wait_until(move || m.interactions(&sid).iter().all(|i| i.is_compared())).await;

        assert_eq!(manager.interactions_for_review(&session.id).len(), 1);
    }

    #[tokio::test]
    async fn end_session_runs_a_final_learning_pass() {
        let (manager, _) = manager_with(
            SimulatedGenerationService::always(proposal_payload()),
            SimulatedEvaluationService::with_learnings(
                0.4,
                vec!["agent tone too formal".into()],
            ),
        );
        let tenant = TenantId::new("acme");
        let session = manager.start_session(&tenant, SessionConfig::default()).unwrap();
        capture(&manager, &tenant);
        capture(&manager, &tenant);

        let m = manager.clone();
        let sid = session.id.clone();
        wait_until(move || m.interactions(&sid).iter().all(|i| i.is_compared())).await;

        let (ended, learning) = manager.end_session(&tenant).await.unwrap();
        assert!(ended.is_terminal());
        assert!(ended.ended_at.is_some());
        assert_eq!(learning.compared_count, 2);
        assert!(learning.has_patterns());

        let err = manager.pause_session(&tenant).unwrap_err();
        assert!(matches!(err, ShadowError::NoActiveSession(_)));
    }

    #[tokio::test]
    async fn stats_aggregate_across_sessions() {
        let (manager, _) = manager_with(
            SimulatedGenerationService::always("draft"),
            SimulatedEvaluationService::with_similarity(0.9),
        );
        let tenant = TenantId::new("acme");

        let first = manager.start_session(&tenant, SessionConfig::default()).unwrap();
        capture(&manager, &tenant);
        let m = manager.clone();
        let sid = first.id.clone();
        wait_until(move || m.interactions(&sid).iter().all(|i| i.is_compared())).await;
        manager.end_session(&tenant).await.unwrap();

        manager.start_session(&tenant, SessionConfig::default()).unwrap();
        capture(&manager, &tenant);

        let stats = manager.shadow_stats(&tenant).unwrap();
        assert_eq!(stats.total_interactions, 2);
        assert!(stats.compared_count >= 1);

        assert!(manager.shadow_stats(&TenantId::new("ghost")).is_none());
    }
}
