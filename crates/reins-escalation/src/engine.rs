//! Escalation engine: decides per action whether human sign-off is required.
//!
//! Evaluation order, first match wins:
//! 1. Action blocked at the level.
//! 2. Level requires approval on all tasks.
//! 3. Level requires approval for the context's task class (effectful,
//!    first contact, sensitive, high value).
//! 4. Escalation rules, in declaration order, honoring overrides.
//! 5. Otherwise no approval needed.

use reins_types::{ActionContext, AutonomyLevel, LevelCapabilities};

use crate::registry::LevelRegistry;
use crate::rules::{default_rules, EscalationRule, RuleAction};

/// The engine's verdict for one action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalCheck {
    pub required: bool,
    /// Why approval is required; always present when `required` is true.
    pub reason: Option<String>,
}

impl ApprovalCheck {
    pub fn not_required() -> Self {
        Self {
            required: false,
            reason: None,
        }
    }

    pub fn required(reason: impl Into<String>) -> Self {
        Self {
            required: true,
            reason: Some(reason.into()),
        }
    }
}

/// Evaluates the fixed rule set against an action's context.
///
/// Pure given `(level, rules, context)`: the engine holds no mutable state
/// and performs no I/O, so identical inputs always yield identical output.
pub struct EscalationEngine {
    registry: LevelRegistry,
    rules: Vec<EscalationRule>,
}

impl EscalationEngine {
    /// Engine with the production capability table and rule set.
    pub fn with_defaults() -> Self {
        Self {
            registry: LevelRegistry::with_defaults(),
            rules: default_rules(),
        }
    }

    /// Engine with explicit configuration (deployment-time override).
    pub fn new(registry: LevelRegistry, rules: Vec<EscalationRule>) -> Self {
        Self { registry, rules }
    }

    /// The capability descriptor the engine holds for a level.
    pub fn capabilities(&self, level: AutonomyLevel) -> LevelCapabilities {
        self.registry.capabilities(level)
    }

    /// Decide whether `action` needs human approval for a tenant at `level`.
    pub fn requires_approval(
        &self,
        level: AutonomyLevel,
        action: &str,
        context: &ActionContext,
    ) -> ApprovalCheck {
        let caps = self.registry.capabilities(level);

        // 1. Blocked outright at this level.
        if caps.blocks(action) {
            return ApprovalCheck::required(format!(
                "action '{}' is blocked at level {}",
                action, level
            ));
        }

        // 2. Blanket approval on all tasks.
        if caps.approval.all_tasks {
            return ApprovalCheck::required(format!(
                "all tasks require approval at level {}",
                level
            ));
        }

        // 3. Task-class approval flags.
        if context.is_effectful && caps.approval.effectful_tasks {
            return ApprovalCheck::required("effectful tasks require approval at this level");
        }
        if context.is_first_contact && caps.approval.first_contact {
            return ApprovalCheck::required("first contact requires approval at this level");
        }
        if context.is_sensitive && caps.approval.sensitive_topics {
            return ApprovalCheck::required("sensitive topics require approval at this level");
        }
        if context.is_high_value && caps.approval.high_value_candidates {
            return ApprovalCheck::required(
                "high-value candidates require approval at this level",
            );
        }

        // 4. Escalation rules, first match wins. A rule is skipped when the
        //    level's descriptor names it, or its own override level is met.
        for rule in &self.rules {
            if !rule.matches(context) {
                continue;
            }
            if caps.overrides_rule(&rule.name) || rule.bypassed_at(level) {
                continue;
            }
            match rule.action {
                RuleAction::RequireApproval | RuleAction::Block => {
                    return ApprovalCheck::required(rule.description.clone());
                }
                // Notification is delivered out of band; it does not gate.
                RuleAction::Notify => continue,
            }
        }

        // 5. Nothing demanded a human.
        ApprovalCheck::not_required()
    }
}

impl Default for EscalationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
