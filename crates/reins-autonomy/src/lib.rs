//! Reins Autonomy - how a surrogate agent earns, keeps, and loses authority.
//!
//! This crate owns the autonomy control loop:
//!
//! - **Metrics aggregation** ([`MetricsAggregator`]): windowed statistics
//!   computed from the external task store, never stored.
//! - **Transition control** ([`TransitionController`]): the only legal way a
//!   tenant's level changes. Enforces the fixed transition graph and
//!   optimistic concurrency, and keeps the append-only history.
//! - **Promotion/demotion evaluation** ([`AutonomyEvaluator`]): applies
//!   level-specific threshold policies and reports every unmet condition,
//!   not just the first.

#![deny(unsafe_code)]

pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod thresholds;
pub mod transition;

pub use error::AutonomyError;
pub use evaluator::{AutonomyEvaluator, DemotionDecision, PromotionDecision};
pub use metrics::MetricsAggregator;
pub use thresholds::{
    DemotionGates, OnboardingGates, PolicyPeriod, ShadowGates, SupervisedGates, ThresholdPolicy,
};
pub use transition::{TransitionController, TransitionRequest};
