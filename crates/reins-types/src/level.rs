//! Autonomy levels and their capability descriptors.
//!
//! A tenant's surrogate agent holds exactly one level at a time. Each level
//! owns a capability descriptor declaring what the agent may do on its own,
//! what is blocked outright, and which task classes always need a human.

use serde::{Deserialize, Serialize};

/// The graduated autonomy ladder.
///
/// Promotion order is `Onboarding → ShadowMode → Supervised → Autonomous`.
/// `Paused` is reachable from any level and resumable to an explicit target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutonomyLevel {
    /// Initial setup: the agent observes configuration only.
    Onboarding,
    /// Passive observation: agent outputs are generated and scored, never sent.
    ShadowMode,
    /// Agent acts, but effectful work routes through human approval.
    Supervised,
    /// Agent acts independently within escalation-rule bounds.
    Autonomous,
    /// All agent activity suspended pending explicit resume.
    Paused,
}

impl AutonomyLevel {
    /// Position on the promotion ladder, used for "below override level"
    /// comparisons. `Paused` carries no earned trust and ranks with
    /// `Onboarding`.
    pub fn rank(&self) -> u8 {
        match self {
            AutonomyLevel::Onboarding => 0,
            AutonomyLevel::ShadowMode => 1,
            AutonomyLevel::Supervised => 2,
            AutonomyLevel::Autonomous => 3,
            AutonomyLevel::Paused => 0,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, AutonomyLevel::Paused)
    }

    /// The next level on the promotion ladder, if any.
    pub fn promotion_target(&self) -> Option<AutonomyLevel> {
        match self {
            AutonomyLevel::Onboarding => Some(AutonomyLevel::ShadowMode),
            AutonomyLevel::ShadowMode => Some(AutonomyLevel::Supervised),
            AutonomyLevel::Supervised => Some(AutonomyLevel::Autonomous),
            AutonomyLevel::Autonomous | AutonomyLevel::Paused => None,
        }
    }

    /// The level a demotion lands on, if this level can be demoted.
    /// Only `Supervised` and `Autonomous` are demotion sources.
    pub fn demotion_target(&self) -> Option<AutonomyLevel> {
        match self {
            AutonomyLevel::Autonomous => Some(AutonomyLevel::Supervised),
            AutonomyLevel::Supervised => Some(AutonomyLevel::ShadowMode),
            _ => None,
        }
    }
}

impl std::fmt::Display for AutonomyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AutonomyLevel::Onboarding => "onboarding",
            AutonomyLevel::ShadowMode => "shadow_mode",
            AutonomyLevel::Supervised => "supervised",
            AutonomyLevel::Autonomous => "autonomous",
            AutonomyLevel::Paused => "paused",
        };
        write!(f, "{}", name)
    }
}

/// Which task classes force human approval at a level, regardless of the
/// escalation rule set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequirements {
    /// Every task needs sign-off.
    pub all_tasks: bool,
    /// Tasks with external side effects need sign-off.
    pub effectful_tasks: bool,
    /// First outreach to a new contact needs sign-off.
    pub first_contact: bool,
    /// Tasks touching sensitive topics need sign-off.
    pub sensitive_topics: bool,
    /// Tasks involving high-value candidates need sign-off.
    pub high_value_candidates: bool,
}

impl ApprovalRequirements {
    /// Blanket approval on everything (onboarding/paused posture).
    pub fn everything() -> Self {
        Self {
            all_tasks: true,
            effectful_tasks: true,
            first_contact: true,
            sensitive_topics: true,
            high_value_candidates: true,
        }
    }
}

/// Capability descriptor owned by an autonomy level.
///
/// Changing these semantics is a deployment-time configuration change,
/// never a runtime data operation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LevelCapabilities {
    /// Actions the agent may perform at this level.
    pub allowed_actions: Vec<String>,
    /// Actions rejected outright at this level.
    pub blocked_actions: Vec<String>,
    /// Blanket approval requirements for this level.
    pub approval: ApprovalRequirements,
    /// Names of escalation rules this level is trusted to skip.
    pub escalation_overrides: Vec<String>,
}

impl LevelCapabilities {
    pub fn allows(&self, action: &str) -> bool {
        self.allowed_actions.iter().any(|a| a == action)
    }

    pub fn blocks(&self, action: &str) -> bool {
        self.blocked_actions.iter().any(|a| a == action)
    }

    pub fn overrides_rule(&self, rule_name: &str) -> bool {
        self.escalation_overrides.iter().any(|r| r == rule_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_orders_the_promotion_ladder() {
        assert!(AutonomyLevel::Onboarding.rank() < AutonomyLevel::ShadowMode.rank());
        assert!(AutonomyLevel::ShadowMode.rank() < AutonomyLevel::Supervised.rank());
        assert!(AutonomyLevel::Supervised.rank() < AutonomyLevel::Autonomous.rank());
    }

    #[test]
    fn paused_ranks_with_onboarding() {
        assert_eq!(
            AutonomyLevel::Paused.rank(),
            AutonomyLevel::Onboarding.rank()
        );
        assert!(AutonomyLevel::Paused.is_paused());
    }

    #[test]
    fn promotion_chain_terminates_at_autonomous() {
        assert_eq!(
            AutonomyLevel::Supervised.promotion_target(),
            Some(AutonomyLevel::Autonomous)
        );
        assert_eq!(AutonomyLevel::Autonomous.promotion_target(), None);
        assert_eq!(AutonomyLevel::Paused.promotion_target(), None);
    }

    #[test]
    fn demotion_steps_down_one_earned_level() {
        assert_eq!(
            AutonomyLevel::Autonomous.demotion_target(),
            Some(AutonomyLevel::Supervised)
        );
        assert_eq!(
            AutonomyLevel::Supervised.demotion_target(),
            Some(AutonomyLevel::ShadowMode)
        );
        assert_eq!(AutonomyLevel::ShadowMode.demotion_target(), None);
        assert_eq!(AutonomyLevel::Onboarding.demotion_target(), None);
    }

    #[test]
    fn capability_lookups() {
        let caps = LevelCapabilities {
            allowed_actions: vec!["draft_message".into()],
            blocked_actions: vec!["send_message".into()],
            approval: ApprovalRequirements::everything(),
            escalation_overrides: vec!["first_contact".into()],
        };
        assert!(caps.allows("draft_message"));
        assert!(caps.blocks("send_message"));
        assert!(caps.overrides_rule("first_contact"));
        assert!(!caps.overrides_rule("compensation_ceiling"));
    }
}
