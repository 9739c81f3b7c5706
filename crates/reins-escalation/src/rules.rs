//! Escalation rules: context predicates that force human approval
//! regardless of autonomy level.

use reins_types::{ActionContext, AutonomyLevel};
use serde::{Deserialize, Serialize};

/// Condition under which an escalation rule matches an action's context.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RuleCondition {
    /// Any of the keywords appears in the action content (case-insensitive
    /// substring match).
    KeywordMatch { keywords: Vec<String> },
    /// The candidate category is one of the listed categories.
    CandidateCategory { categories: Vec<String> },
    /// The task type is one of the listed types.
    TaskType { task_types: Vec<String> },
    /// The action's numeric value exceeds the ceiling.
    ValueAbove { max: f64 },
    /// The action is a first contact.
    FirstContact,
    /// Named custom predicate, resolved by deployment configuration.
    Custom(String),
}

/// What a matching rule demands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleAction {
    /// A human must approve before the action proceeds.
    RequireApproval,
    /// Surface the action to a human without blocking it.
    Notify,
    /// The action may not proceed at all.
    Block,
}

/// A predicate over an action's context that forces human involvement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EscalationRule {
    /// Stable rule name, referenced by level `escalation_overrides`.
    pub name: String,
    /// Human-readable description, used as the approval reason.
    pub description: String,
    pub condition: RuleCondition,
    pub action: RuleAction,
    /// Levels at or above this one may skip the rule. Unset means the rule
    /// can never be bypassed.
    pub override_level: Option<AutonomyLevel>,
}

impl EscalationRule {
    /// Whether the rule's condition matches the context.
    pub fn matches(&self, context: &ActionContext) -> bool {
        match &self.condition {
            RuleCondition::KeywordMatch { keywords } => {
                let content = context.content.to_lowercase();
                keywords.iter().any(|k| content.contains(&k.to_lowercase()))
            }
            RuleCondition::CandidateCategory { categories } => context
                .candidate_category
                .as_deref()
                .map(|c| categories.iter().any(|cat| cat.eq_ignore_ascii_case(c)))
                .unwrap_or(false),
            RuleCondition::TaskType { task_types } => {
                task_types.iter().any(|t| t == &context.task_type)
            }
            RuleCondition::ValueAbove { max } => {
                context.value.map(|v| v > *max).unwrap_or(false)
            }
            RuleCondition::FirstContact => context.is_first_contact,
            // TODO: resolve named custom predicates from deployment config
            RuleCondition::Custom(_name) => false,
        }
    }

    /// Whether a tenant at `level` may skip this rule.
    pub fn bypassed_at(&self, level: AutonomyLevel) -> bool {
        match self.override_level {
            Some(override_level) => level.rank() >= override_level.rank(),
            None => false,
        }
    }
}

/// The production escalation rule set.
pub fn default_rules() -> Vec<EscalationRule> {
    vec![
        EscalationRule {
            name: "sensitive_keywords".into(),
            description: "content touches a sensitive topic (compensation, legal, immigration)"
                .into(),
            condition: RuleCondition::KeywordMatch {
                keywords: vec![
                    "salary".into(),
                    "equity".into(),
                    "visa".into(),
                    "termination".into(),
                    "lawsuit".into(),
                ],
            },
            action: RuleAction::RequireApproval,
            override_level: None,
        },
        EscalationRule {
            name: "compensation_ceiling".into(),
            description: "compensation figure exceeds the autonomous ceiling".into(),
            condition: RuleCondition::ValueAbove { max: 200_000.0 },
            action: RuleAction::RequireApproval,
            override_level: None,
        },
        EscalationRule {
            name: "executive_candidates".into(),
            description: "executive-track candidates always get human review".into(),
            condition: RuleCondition::CandidateCategory {
                categories: vec!["executive".into(), "c-suite".into()],
            },
            action: RuleAction::RequireApproval,
            override_level: None,
        },
        EscalationRule {
            name: "first_contact".into(),
            description: "first outreach to a new contact".into(),
            condition: RuleCondition::FirstContact,
            action: RuleAction::RequireApproval,
            override_level: Some(AutonomyLevel::Autonomous),
        },
        EscalationRule {
            name: "bulk_outreach".into(),
            description: "bulk outreach campaigns need a human check".into(),
            condition: RuleCondition::TaskType {
                task_types: vec!["bulk_outreach".into()],
            },
            action: RuleAction::RequireApproval,
            override_level: Some(AutonomyLevel::Autonomous),
        },
        EscalationRule {
            name: "offer_extended".into(),
            description: "an offer went out; notify the account owner".into(),
            condition: RuleCondition::TaskType {
                task_types: vec!["offer".into()],
            },
            action: RuleAction::Notify,
            override_level: None,
        },
    ]
}
