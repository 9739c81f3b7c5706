//! Action context: the facts needed to decide escalation and capture
//! eligibility for a single agent action.

use serde::{Deserialize, Serialize};

/// The facts about one action, as seen by the escalation engine.
///
/// Contexts are assembled by the caller at the point where the action becomes
/// effectful; the engine never reaches for hidden state beyond these fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActionContext {
    /// Task classification (e.g. "outreach", "scheduling", "offer").
    pub task_type: String,
    /// Free text content of the action (message body, decision rationale).
    pub content: String,
    /// Candidate category, when the action concerns a candidate.
    pub candidate_category: Option<String>,
    /// Numeric value attached to the action (e.g. a compensation figure).
    pub value: Option<f64>,
    /// The action has external side effects.
    pub is_effectful: bool,
    /// The action is the first contact with its recipient.
    pub is_first_contact: bool,
    /// The action touches a sensitive topic.
    pub is_sensitive: bool,
    /// The action concerns a high-value candidate.
    pub is_high_value: bool,
}

impl ActionContext {
    pub fn new(task_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_candidate_category(mut self, category: impl Into<String>) -> Self {
        self.candidate_category = Some(category.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn effectful(mut self) -> Self {
        self.is_effectful = true;
        self
    }

    pub fn first_contact(mut self) -> Self {
        self.is_first_contact = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.is_sensitive = true;
        self
    }

    pub fn high_value(mut self) -> Self {
        self.is_high_value = true;
        self
    }
}
