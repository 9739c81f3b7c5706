//! Captured interactions: one human action, optionally paired with the
//! agent's independently generated alternative and a scored comparison.

use crate::{ActionContext, InteractionId, InteractionKind, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the human actually did.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HumanAction {
    /// Message body or decision description.
    pub content: String,
    /// Free-form annotations supplied at capture time.
    pub metadata: HashMap<String, String>,
}

impl HumanAction {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }
}

/// What the agent would have done, produced asynchronously after capture.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentAlternative {
    pub content: String,
    pub confidence: f64,
    pub reasoning: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Per-dimension similarity scoring between human and agent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DimensionScore {
    pub name: String,
    pub human_score: f64,
    pub agent_score: f64,
}

/// Scored similarity between a human action and the agent's alternative.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Overall similarity in [0, 1].
    pub similarity: f64,
    /// `similarity >= comparison_threshold` at scoring time.
    pub is_match: bool,
    pub dimensions: Vec<DimensionScore>,
    /// Free-text deltas describing where agent and human diverged.
    pub learnings: Vec<String>,
}

impl ComparisonResult {
    /// The degraded result used when the evaluation service fails: neutral
    /// similarity, never counted as a match, no learnings.
    pub fn fallback() -> Self {
        Self {
            similarity: 0.5,
            is_match: false,
            dimensions: vec![],
            learnings: vec![],
        }
    }
}

/// One human action paired with its context.
///
/// Created at capture time with only `human_action` set; becomes "compared"
/// once the background pipeline fills in `agent_alternative` and
/// `comparison`. On pipeline failure it remains pending forever; capture is
/// never rolled back.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapturedInteraction {
    pub id: InteractionId,
    pub session_id: SessionId,
    pub kind: InteractionKind,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub context: ActionContext,
    pub human_action: HumanAction,
    pub agent_alternative: Option<AgentAlternative>,
    pub comparison: Option<ComparisonResult>,
}

impl CapturedInteraction {
    pub fn new(
        session_id: SessionId,
        kind: InteractionKind,
        context: ActionContext,
        human_action: HumanAction,
    ) -> Self {
        Self {
            id: InteractionId::generate(),
            session_id,
            kind,
            timestamp: chrono::Utc::now(),
            context,
            human_action,
            agent_alternative: None,
            comparison: None,
        }
    }

    /// Both the alternative and its comparison have landed.
    pub fn is_compared(&self) -> bool {
        self.agent_alternative.is_some() && self.comparison.is_some()
    }
}
