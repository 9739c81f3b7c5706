//! Threshold policies for promotion and demotion.
//!
//! Every gate is deployment-configurable; the defaults here are the
//! production values. Deserializable so operators can ship a policy file.

use reins_types::MetricsPeriod;
use serde::{Deserialize, Serialize};

/// Gates for promoting out of onboarding into shadow mode.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OnboardingGates {
    /// Minimum hours spent onboarding before shadow capture may begin.
    pub min_hours: f64,
}

impl Default for OnboardingGates {
    fn default() -> Self {
        Self { min_hours: 24.0 }
    }
}

/// Gates for promoting from shadow mode into supervised operation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShadowGates {
    pub min_hours: f64,
    /// Captured interactions needed before the match rate is trusted.
    pub min_interactions: usize,
    /// Minimum agent-vs-human match rate across compared interactions.
    pub min_match_rate: f64,
}

impl Default for ShadowGates {
    fn default() -> Self {
        Self {
            min_hours: 168.0,
            min_interactions: 100,
            min_match_rate: 0.7,
        }
    }
}

/// Gates for promoting from supervised into autonomous operation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SupervisedGates {
    pub min_hours: f64,
    /// Approved (completed) tasks needed in the evaluation window.
    pub min_approvals: usize,
    pub min_approval_rate: f64,
    pub max_error_rate: f64,
    pub min_response_rate: f64,
}

impl Default for SupervisedGates {
    fn default() -> Self {
        Self {
            min_hours: 336.0,
            min_approvals: 50,
            min_approval_rate: 0.85,
            max_error_rate: 0.05,
            min_response_rate: 0.5,
        }
    }
}

/// Breach thresholds that trigger demotion. Any single breach demotes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DemotionGates {
    pub max_error_rate: f64,
    pub max_rejection_rate: f64,
    pub max_complaints: usize,
    /// Demote when response rate falls below this, provided any messages
    /// were sent in the window.
    pub min_response_rate: f64,
}

impl Default for DemotionGates {
    fn default() -> Self {
        Self {
            max_error_rate: 0.15,
            max_rejection_rate: 0.3,
            max_complaints: 2,
            min_response_rate: 0.3,
        }
    }
}

/// The full threshold policy the evaluator runs against.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdPolicy {
    pub onboarding: OnboardingGates,
    pub shadow: ShadowGates,
    pub supervised: SupervisedGates,
    pub demotion: DemotionGates,
    /// Window the evaluator aggregates task metrics over.
    pub metrics_period: PolicyPeriod,
}

/// Wrapper so the policy file can default the period without a custom
/// `Default` impl on the shared enum.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyPeriod(pub MetricsPeriod);

impl Default for PolicyPeriod {
    fn default() -> Self {
        Self(MetricsPeriod::Week)
    }
}

impl ThresholdPolicy {
    pub fn period(&self) -> MetricsPeriod {
        self.metrics_period.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_values() {
        let policy = ThresholdPolicy::default();
        assert_eq!(policy.shadow.min_hours, 168.0);
        assert_eq!(policy.shadow.min_interactions, 100);
        assert_eq!(policy.supervised.min_approvals, 50);
        assert_eq!(policy.demotion.max_error_rate, 0.15);
        assert_eq!(policy.demotion.max_complaints, 2);
        assert!(matches!(policy.period(), MetricsPeriod::Week));
    }

    #[test]
    fn partial_policy_file_falls_back_to_defaults() {
        let policy: ThresholdPolicy =
            serde_json::from_str(r#"{"shadow": {"min_hours": 72.0, "min_interactions": 20, "min_match_rate": 0.6}}"#)
                .unwrap();
        assert_eq!(policy.shadow.min_hours, 72.0);
        assert_eq!(policy.supervised.min_approval_rate, 0.85);
    }
}
