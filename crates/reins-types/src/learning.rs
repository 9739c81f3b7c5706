//! Learning artifacts: recurring deltas between human and agent behavior,
//! aggregated into patterns and proposed guideline updates.
//!
//! Learning has NO authority. Proposals only reach policy through the
//! guidelines store, where a human reviews them.

use crate::SessionId;
use serde::{Deserialize, Serialize};

/// A recurring qualitative delta between human and agent behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearnedPattern {
    /// Normalized learning text this pattern clusters.
    pub description: String,
    /// How many compared interactions exhibited it.
    pub frequency: usize,
    /// Up to three example snippets from the source interactions.
    pub examples: Vec<String>,
    /// frequency / compared interaction count at aggregation time.
    pub confidence: f64,
}

/// A proposed change to the tenant's agent guidelines, pending human review.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuidelineUpdate {
    /// Kind of change ("tone", "qualification", "process", ...).
    pub update_type: String,
    /// Which guideline section the change targets.
    pub path: String,
    /// Why the change is proposed, referencing observed patterns.
    pub reason: String,
    /// The concrete suggested wording or rule change.
    pub suggested_change: String,
}

/// The output of one learning pass over a session snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShadowLearning {
    pub session_id: SessionId,
    pub patterns: Vec<LearnedPattern>,
    pub proposed_updates: Vec<GuidelineUpdate>,
    /// Compared interaction count in the snapshot this pass read.
    pub compared_count: usize,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl ShadowLearning {
    pub fn empty(session_id: SessionId) -> Self {
        Self {
            session_id,
            patterns: vec![],
            proposed_updates: vec![],
            compared_count: 0,
            generated_at: chrono::Utc::now(),
        }
    }

    pub fn has_patterns(&self) -> bool {
        !self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_learning_has_no_patterns() {
        let learning = ShadowLearning::empty(SessionId::new("s"));
        assert!(!learning.has_patterns());
        assert!(learning.proposed_updates.is_empty());
    }
}
