//! Reins Service - the single entry point for autonomy governance.
//!
//! [`AutonomyGovernor`] composes the escalation engine, the autonomy
//! control loop, and the shadow-mode machinery behind one API, wired to
//! the deployment's external services at construction time.

#![deny(unsafe_code)]

pub mod error;
pub mod governor;
pub mod telemetry;

pub use error::GovernorError;
pub use governor::{AutonomyGovernor, GovernorDeps};
pub use telemetry::init_tracing;
