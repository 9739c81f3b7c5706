//! Scores a human action against the agent's generated alternative.

use std::sync::Arc;

use reins_services::EvaluationService;
use reins_types::{ComparisonResult, InteractionKind};
use tracing::warn;

/// Wraps the evaluation service, applying the match threshold and degrading
/// gracefully when the service is down.
pub struct Comparator {
    evaluation: Arc<dyn EvaluationService>,
}

impl Comparator {
    pub fn new(evaluation: Arc<dyn EvaluationService>) -> Self {
        Self { evaluation }
    }

    /// Compare the two actions and decide whether they match.
    ///
    /// Never fails: an evaluation-service error yields
    /// [`ComparisonResult::fallback`], which scores neutral and never counts
    /// as a match.
    pub async fn compare(
        &self,
        human_content: &str,
        agent_content: &str,
        kind: InteractionKind,
        threshold: f64,
    ) -> ComparisonResult {
        match self.evaluation.compare(human_content, agent_content, kind).await {
            Ok(raw) => {
                let similarity = raw.similarity.clamp(0.0, 1.0);
                ComparisonResult {
                    similarity,
                    is_match: similarity >= threshold,
                    dimensions: raw.dimensions,
                    learnings: raw.learnings,
                }
            }
            Err(e) => {
                warn!(error = %e, "evaluation service failed, using fallback comparison");
                ComparisonResult::fallback()
            }
        }
    }
}
