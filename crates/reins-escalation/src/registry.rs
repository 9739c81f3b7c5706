//! Level registry: static map from autonomy level to capability descriptor.
//!
//! The registry is built once at construction and never mutated at runtime.
//! Changing capability semantics is a deployment-time config change, not a
//! data operation.

use std::collections::HashMap;

use reins_types::{ApprovalRequirements, AutonomyLevel, LevelCapabilities};

/// Pure lookup from level to capability descriptor.
pub struct LevelRegistry {
    capabilities: HashMap<AutonomyLevel, LevelCapabilities>,
}

impl LevelRegistry {
    /// Build the registry with the production capability table.
    pub fn with_defaults() -> Self {
        let mut capabilities = HashMap::new();

        capabilities.insert(
            AutonomyLevel::Onboarding,
            LevelCapabilities {
                allowed_actions: vec!["view_candidates".into()],
                blocked_actions: vec![
                    "draft_message".into(),
                    "send_message".into(),
                    "schedule_interview".into(),
                    "advance_candidate".into(),
                    "reject_candidate".into(),
                    "extend_offer".into(),
                ],
                approval: ApprovalRequirements::everything(),
                escalation_overrides: vec![],
            },
        );

        capabilities.insert(
            AutonomyLevel::ShadowMode,
            LevelCapabilities {
                allowed_actions: vec!["view_candidates".into(), "draft_message".into()],
                blocked_actions: vec![
                    "send_message".into(),
                    "schedule_interview".into(),
                    "advance_candidate".into(),
                    "reject_candidate".into(),
                    "extend_offer".into(),
                ],
                approval: ApprovalRequirements::everything(),
                escalation_overrides: vec![],
            },
        );

        capabilities.insert(
            AutonomyLevel::Supervised,
            LevelCapabilities {
                allowed_actions: vec![
                    "view_candidates".into(),
                    "draft_message".into(),
                    "send_message".into(),
                    "schedule_interview".into(),
                    "advance_candidate".into(),
                    "reject_candidate".into(),
                ],
                blocked_actions: vec!["extend_offer".into()],
                approval: ApprovalRequirements {
                    all_tasks: false,
                    effectful_tasks: true,
                    first_contact: true,
                    sensitive_topics: true,
                    high_value_candidates: true,
                },
                escalation_overrides: vec![],
            },
        );

        capabilities.insert(
            AutonomyLevel::Autonomous,
            LevelCapabilities {
                allowed_actions: vec![
                    "view_candidates".into(),
                    "draft_message".into(),
                    "send_message".into(),
                    "schedule_interview".into(),
                    "advance_candidate".into(),
                    "reject_candidate".into(),
                    "extend_offer".into(),
                ],
                blocked_actions: vec![],
                approval: ApprovalRequirements {
                    all_tasks: false,
                    effectful_tasks: false,
                    first_contact: false,
                    sensitive_topics: true,
                    high_value_candidates: true,
                },
                escalation_overrides: vec!["first_contact".into(), "bulk_outreach".into()],
            },
        );

        capabilities.insert(
            AutonomyLevel::Paused,
            LevelCapabilities {
                allowed_actions: vec![],
                blocked_actions: vec![
                    "view_candidates".into(),
                    "draft_message".into(),
                    "send_message".into(),
                    "schedule_interview".into(),
                    "advance_candidate".into(),
                    "reject_candidate".into(),
                    "extend_offer".into(),
                ],
                approval: ApprovalRequirements::everything(),
                escalation_overrides: vec![],
            },
        );

        Self { capabilities }
    }

    /// Build a registry from an explicit table (deployment-time config).
    pub fn from_table(capabilities: HashMap<AutonomyLevel, LevelCapabilities>) -> Self {
        Self { capabilities }
    }

    /// The capability descriptor for a level.
    ///
    /// Every level is present in the default table; a missing entry from a
    /// custom table is treated as fully locked down.
    pub fn capabilities(&self, level: AutonomyLevel) -> LevelCapabilities {
        self.capabilities.get(&level).cloned().unwrap_or_else(|| {
            LevelCapabilities {
                allowed_actions: vec![],
                blocked_actions: vec![],
                approval: ApprovalRequirements::everything(),
                escalation_overrides: vec![],
            }
        })
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
