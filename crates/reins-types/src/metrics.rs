//! Windowed autonomy metrics.
//!
//! Metrics are computed snapshots, never stored. Absence of data yields
//! zero rates with zero totals rather than an error.

use serde::{Deserialize, Serialize};

/// The time window a metrics snapshot covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricsPeriod {
    Day,
    Week,
    Month,
}

impl MetricsPeriod {
    /// Window length: snapshot covers `now - window() .. now`.
    pub fn window(&self) -> chrono::Duration {
        match self {
            MetricsPeriod::Day => chrono::Duration::days(1),
            MetricsPeriod::Week => chrono::Duration::days(7),
            MetricsPeriod::Month => chrono::Duration::days(30),
        }
    }
}

/// A computed snapshot of tenant performance over one window.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AutonomyMetrics {
    pub period: Option<MetricsPeriod>,

    // Raw counts
    pub total_tasks: usize,
    pub approved_tasks: usize,
    pub rejected_tasks: usize,
    pub escalated_tasks: usize,
    pub failed_tasks: usize,
    pub complaints: usize,
    pub messages_sent: usize,
    pub responses_received: usize,
    /// Mean seconds between task creation and human approval, where both
    /// timestamps exist.
    pub mean_approval_latency_secs: Option<f64>,

    // Derived scores, all clamped to [0, 1]
    pub approval_rate: f64,
    pub error_rate: f64,
    pub escalation_rate: f64,
    /// rejected / (approved + rejected); used only by demotion.
    pub rejection_rate: f64,
    pub response_rate: f64,
}

impl AutonomyMetrics {
    /// The snapshot for a window that contained no tasks.
    pub fn empty(period: MetricsPeriod) -> Self {
        Self {
            period: Some(period),
            ..Default::default()
        }
    }

    pub fn has_data(&self) -> bool {
        self.total_tasks > 0
    }
}

/// Clamp a ratio into [0, 1], mapping a zero denominator to 0.
pub fn safe_rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        (numerator as f64 / denominator as f64).clamp(0.0, 1.0)
    }
}
