//! Learning aggregation: turns comparison deltas into patterns and
//! proposed guideline updates.
//!
//! A learning pass reads a snapshot of compared interactions and never
//! fails; degraded services shrink the output instead. Proposals carry no
//! authority of their own, they only land in the guidelines store for a
//! human to review.

use std::collections::HashMap;
use std::sync::Arc;

use reins_services::{
    parse_guideline_proposals, GenerationPurpose, GenerationRequest, GenerationService,
    GuidelinesStore, ProposalParse,
};
use reins_types::{CapturedInteraction, GuidelineUpdate, LearnedPattern, SessionId, ShadowLearning};
use tracing::{info, warn};

/// Minimum occurrences before a delta counts as a pattern.
const PATTERN_MIN_FREQUENCY: usize = 2;
/// Example snippets retained per pattern.
const PATTERN_MAX_EXAMPLES: usize = 3;
/// Worst-scoring mismatches included in the proposal prompt.
const PROMPT_MISMATCH_COUNT: usize = 3;

/// Aggregates learnings over a session snapshot and drafts proposals.
pub struct LearningAggregator {
    generation: Arc<dyn GenerationService>,
    guidelines: Arc<dyn GuidelinesStore>,
}

impl LearningAggregator {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        guidelines: Arc<dyn GuidelinesStore>,
    ) -> Self {
        Self {
            generation,
            guidelines,
        }
    }

    /// Run one learning pass over the given interaction snapshot.
    pub async fn run(
        &self,
        session: &SessionId,
        interactions: &[CapturedInteraction],
    ) -> ShadowLearning {
        let compared: Vec<&CapturedInteraction> =
            interactions.iter().filter(|i| i.is_compared()).collect();
        if compared.is_empty() {
            return ShadowLearning::empty(session.clone());
        }

        let patterns = extract_patterns(&compared);
        let proposed_updates = if patterns.is_empty() {
            vec![]
        } else {
            self.draft_proposals(&patterns, &compared).await
        };

        if !proposed_updates.is_empty() {
            if let Err(e) = self.guidelines.submit(session, &proposed_updates).await {
                warn!(session = %session, error = %e, "failed to submit guideline proposals");
            }
        }

        info!(
            session = %session,
            compared = compared.len(),
            patterns = patterns.len(),
            proposals = proposed_updates.len(),
            "learning pass completed"
        );

        ShadowLearning {
            session_id: session.clone(),
            patterns,
            proposed_updates,
            compared_count: compared.len(),
            generated_at: chrono::Utc::now(),
        }
    }

    async fn draft_proposals(
        &self,
        patterns: &[LearnedPattern],
        compared: &[&CapturedInteraction],
    ) -> Vec<GuidelineUpdate> {
        let request = GenerationRequest::new(
            GenerationPurpose::GuidelineProposals,
            proposal_prompt(patterns, compared),
        );
        let result = match self.generation.generate(&request).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "proposal generation failed, skipping this pass");
                return vec![];
            }
        };
        match parse_guideline_proposals(&result.content) {
            ProposalParse::Parsed(updates) => updates,
            ProposalParse::Fallback { reason } => {
                warn!(reason = %reason, "discarding unparseable guideline proposals");
                vec![]
            }
        }
    }
}

/// Cluster comparison learnings into recurring patterns.
///
/// Learnings are normalized (trimmed, lowercased) before counting; a text
/// seen in at least [`PATTERN_MIN_FREQUENCY`] interactions becomes a
/// pattern with confidence `frequency / compared_count`.
fn extract_patterns(compared: &[&CapturedInteraction]) -> Vec<LearnedPattern> {
    let mut frequencies: HashMap<String, (usize, Vec<String>)> = HashMap::new();
    for interaction in compared {
        let comparison = match &interaction.comparison {
            Some(c) => c,
            None => continue,
        };
        for learning in &comparison.learnings {
            let normalized = learning.trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            let entry = frequencies.entry(normalized).or_insert_with(|| (0, vec![]));
            entry.0 += 1;
            if entry.1.len() < PATTERN_MAX_EXAMPLES {
                entry.1.push(interaction.human_action.content.clone());
            }
        }
    }

    let compared_count = compared.len();
    let mut patterns: Vec<LearnedPattern> = frequencies
        .into_iter()
        .filter(|(_, (frequency, _))| *frequency >= PATTERN_MIN_FREQUENCY)
        .map(|(description, (frequency, examples))| LearnedPattern {
            description,
            frequency,
            examples,
            confidence: frequency as f64 / compared_count as f64,
        })
        .collect();
    patterns.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.description.cmp(&b.description)));
    patterns
}

fn proposal_prompt(patterns: &[LearnedPattern], compared: &[&CapturedInteraction]) -> String {
    let mut prompt = String::from(
        "Recurring differences were observed between the agent's drafts and what \
         the team actually did. Propose guideline updates as a JSON array of \
         objects with update_type, path, reason, and suggested_change.\n\nPatterns:\n",
    );
    for pattern in patterns {
        prompt.push_str(&format!(
            "- {} (seen {} times, confidence {:.2})\n",
            pattern.description, pattern.frequency, pattern.confidence
        ));
    }

    let mut mismatches: Vec<&&CapturedInteraction> = compared
        .iter()
        .filter(|i| i.comparison.as_ref().is_some_and(|c| !c.is_match))
        .collect();
    mismatches.sort_by(|a, b| {
        let sa = a.comparison.as_ref().map(|c| c.similarity).unwrap_or(1.0);
        let sb = b.comparison.as_ref().map(|c| c.similarity).unwrap_or(1.0);
        sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
    });
    if !mismatches.is_empty() {
        prompt.push_str("\nWorst divergences:\n");
        for interaction in mismatches.iter().take(PROMPT_MISMATCH_COUNT) {
            let (similarity, agent) = match (&interaction.comparison, &interaction.agent_alternative)
            {
                (Some(c), Some(a)) => (c.similarity, a.content.as_str()),
                _ => continue,
            };
            prompt.push_str(&format!(
                "- similarity {:.2}; human: {}; agent: {}\n",
                similarity, interaction.human_action.content, agent
            ));
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use reins_services::{
        InMemoryGuidelinesStore, SimulatedGenerationService,
    };
    use reins_types::{
        ActionContext, AgentAlternative, ComparisonResult, HumanAction, InteractionKind,
    };

    fn compared_interaction(
        session: &SessionId,
        similarity: f64,
        learnings: Vec<&str>,
    ) -> CapturedInteraction {
        let mut interaction = CapturedInteraction::new(
            session.clone(),
            InteractionKind::Message,
            ActionContext::new("outreach", "reach out about the backend role"),
            HumanAction::new("Hey! Saw your distributed-systems work, keen to chat."),
        );
        interaction.agent_alternative = Some(AgentAlternative {
            content: "Dear candidate, I write regarding an opportunity.".into(),
            confidence: 0.8,
            reasoning: "drafted from role template".into(),
            generated_at: chrono::Utc::now(),
        });
        interaction.comparison = Some(ComparisonResult {
            similarity,
            is_match: similarity >= 0.7,
            dimensions: vec![],
            learnings: learnings.into_iter().map(str::to_string).collect(),
        });
        interaction
    }

    fn proposal_payload() -> String {
        serde_json::to_string(&vec![GuidelineUpdate {
            update_type: "tone".into(),
            path: "messaging/outreach".into(),
            reason: "agent register too formal".into(),
            suggested_change: "Open conversationally, reference the candidate's work".into(),
        }])
        .unwrap()
    }

    #[tokio::test]
    async fn recurring_learnings_become_patterns() {
        let session = SessionId::new("s");
        let interactions = vec![
            compared_interaction(&session, 0.4, vec!["Agent tone too formal "]),
            compared_interaction(&session, 0.5, vec!["agent tone too formal"]),
            compared_interaction(&session, 0.9, vec!["one-off nit"]),
        ];
        let aggregator = LearningAggregator::new(
            Arc::new(SimulatedGenerationService::always(proposal_payload())),
            Arc::new(InMemoryGuidelinesStore::new()),
        );

        let learning = aggregator.run(&session, &interactions).await;
        assert_eq!(learning.compared_count, 3);
        assert_eq!(learning.patterns.len(), 1);
        let pattern = &learning.patterns[0];
        assert_eq!(pattern.description, "agent tone too formal");
        assert_eq!(pattern.frequency, 2);
        assert!((pattern.confidence - 2.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(pattern.examples.len(), 2);
    }

    #[tokio::test]
    async fn singleton_learnings_never_cluster() {
        let session = SessionId::new("s");
        let interactions = vec![
            compared_interaction(&session, 0.4, vec!["missed must-have skill"]),
            compared_interaction(&session, 0.5, vec!["missed must-have skill"]),
            compared_interaction(&session, 0.6, vec!["missed must-have skill"]),
            compared_interaction(&session, 0.8, vec!["too verbose"]),
            compared_interaction(&session, 0.9, vec!["wrong greeting"]),
        ];
        let aggregator = LearningAggregator::new(
            Arc::new(SimulatedGenerationService::always(proposal_payload())),
            Arc::new(InMemoryGuidelinesStore::new()),
        );

        let learning = aggregator.run(&session, &interactions).await;
        assert_eq!(learning.patterns.len(), 1);
        assert_eq!(learning.patterns[0].description, "missed must-have skill");
        assert_eq!(learning.patterns[0].frequency, 3);
        assert!((learning.patterns[0].confidence - 0.6).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn proposals_are_submitted_for_review() {
        let session = SessionId::new("s");
        let interactions = vec![
            compared_interaction(&session, 0.4, vec!["agent tone too formal"]),
            compared_interaction(&session, 0.5, vec!["agent tone too formal"]),
        ];
        let store = Arc::new(InMemoryGuidelinesStore::new());
        let aggregator = LearningAggregator::new(
            Arc::new(SimulatedGenerationService::always(proposal_payload())),
            store.clone(),
        );

        let learning = aggregator.run(&session, &interactions).await;
        assert_eq!(learning.proposed_updates.len(), 1);
        assert_eq!(store.for_session(&session).len(), 1);
    }

    #[tokio::test]
    async fn no_patterns_means_no_generation_call() {
        let session = SessionId::new("s");
        let interactions = vec![compared_interaction(&session, 0.9, vec!["one-off"])];
        let generation = Arc::new(SimulatedGenerationService::always(proposal_payload()));
        let aggregator = LearningAggregator::new(
            generation.clone(),
            Arc::new(InMemoryGuidelinesStore::new()),
        );

        let learning = aggregator.run(&session, &interactions).await;
        assert!(!learning.has_patterns());
        assert!(learning.proposed_updates.is_empty());
        assert!(generation.requests().is_empty());
    }

    #[tokio::test]
    async fn unparseable_proposals_are_discarded() {
        let session = SessionId::new("s");
        let interactions = vec![
            compared_interaction(&session, 0.4, vec!["agent tone too formal"]),
            compared_interaction(&session, 0.5, vec!["agent tone too formal"]),
        ];
        let store = Arc::new(InMemoryGuidelinesStore::new());
        let aggregator = LearningAggregator::new(
            Arc::new(SimulatedGenerationService::always("not json")),
            store.clone(),
        );

        let learning = aggregator.run(&session, &interactions).await;
        assert_eq!(learning.patterns.len(), 1);
        assert!(learning.proposed_updates.is_empty());
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn generation_failure_shrinks_output_without_erroring() {
        let session = SessionId::new("s");
        let interactions = vec![
            compared_interaction(&session, 0.4, vec!["agent tone too formal"]),
            compared_interaction(&session, 0.5, vec!["agent tone too formal"]),
        ];
        let aggregator = LearningAggregator::new(
            Arc::new(SimulatedGenerationService::failing()),
            Arc::new(InMemoryGuidelinesStore::new()),
        );

        let learning = aggregator.run(&session, &interactions).await;
        assert!(learning.has_patterns());
        assert!(learning.proposed_updates.is_empty());
    }

    #[tokio::test]
    async fn empty_snapshot_yields_empty_learning() {
        let session = SessionId::new("s");
        let aggregator = LearningAggregator::new(
            Arc::new(SimulatedGenerationService::always(proposal_payload())),
            Arc::new(InMemoryGuidelinesStore::new()),
        );
        let learning = aggregator.run(&session, &[]).await;
        assert_eq!(learning.compared_count, 0);
        assert!(!learning.has_patterns());
    }
}
