//! Evaluation service contract: scores similarity between a human action
//! and the agent's generated alternative.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reins_types::{DimensionScore, InteractionKind};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Raw similarity scoring as returned by the evaluation service,
/// before the comparison threshold is applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawComparison {
    pub similarity: f64,
    pub dimensions: Vec<DimensionScore>,
    pub learnings: Vec<String>,
}

/// Contract for the external evaluation/comparison service.
#[async_trait]
pub trait EvaluationService: Send + Sync {
    async fn compare(
        &self,
        human_content: &str,
        agent_content: &str,
        kind: InteractionKind,
    ) -> Result<RawComparison, ServiceError>;
}

/// A simulated evaluation service for testing and development.
pub struct SimulatedEvaluationService {
    queued: Mutex<VecDeque<RawComparison>>,
    default: RawComparison,
    fail: bool,
}

impl SimulatedEvaluationService {
    /// Always score the given similarity with no learnings.
    pub fn with_similarity(similarity: f64) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            default: RawComparison {
                similarity,
                dimensions: vec![],
                learnings: vec![],
            },
            fail: false,
        }
    }

    /// Always score the given similarity and report the given learnings.
    pub fn with_learnings(similarity: f64, learnings: Vec<String>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            default: RawComparison {
                similarity,
                dimensions: vec![],
                learnings,
            },
            fail: false,
        }
    }

    /// Error on every call.
    pub fn failing() -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            default: RawComparison {
                similarity: 0.0,
                dimensions: vec![],
                learnings: vec![],
            },
            fail: true,
        }
    }

    /// Queue a comparison to be served before the default.
    pub fn enqueue(&self, comparison: RawComparison) {
        self.queued.lock().unwrap().push_back(comparison);
    }
}

#[async_trait]
impl EvaluationService for SimulatedEvaluationService {
    async fn compare(
        &self,
        _human_content: &str,
        _agent_content: &str,
        _kind: InteractionKind,
    ) -> Result<RawComparison, ServiceError> {
        if self.fail {
            return Err(ServiceError::Unavailable(
                "simulated evaluation failure".into(),
            ));
        }
        let queued = self.queued.lock().unwrap().pop_front();
        Ok(queued.unwrap_or_else(|| self.default.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_similarity_served() {
        let svc = SimulatedEvaluationService::with_similarity(0.85);
        let raw = svc
            .compare("human text", "agent text", InteractionKind::Message)
            .await
            .unwrap();
        assert_eq!(raw.similarity, 0.85);
    }

    #[tokio::test]
    async fn queued_comparisons_served_in_order() {
        let svc = SimulatedEvaluationService::with_similarity(0.5);
        svc.enqueue(RawComparison {
            similarity: 0.9,
            dimensions: vec![],
            learnings: vec!["tone mismatch".into()],
        });
        let first = svc
            .compare("a", "b", InteractionKind::Decision)
            .await
            .unwrap();
        assert_eq!(first.similarity, 0.9);
        let second = svc
            .compare("a", "b", InteractionKind::Decision)
            .await
            .unwrap();
        assert_eq!(second.similarity, 0.5);
    }

    #[tokio::test]
    async fn failing_service_errors() {
        let svc = SimulatedEvaluationService::failing();
        assert!(svc
            .compare("a", "b", InteractionKind::Message)
            .await
            .is_err());
    }
}
