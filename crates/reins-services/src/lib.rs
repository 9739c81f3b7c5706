//! Reins Services - contracts for the engine's external collaborators.
//!
//! The governance engine consumes generation, evaluation, task, tenant, and
//! guideline services but owns none of them. Each contract is an
//! `async_trait` object constructed once at process start and passed by
//! reference, never a module-level singleton. Every trait ships with an
//! in-memory/simulated implementation for tests and development.

#![deny(unsafe_code)]

pub mod error;
pub mod evaluation;
pub mod generation;
pub mod guidelines;
pub mod stats;
pub mod tasks;
pub mod tenants;

pub use error::ServiceError;
pub use evaluation::{EvaluationService, RawComparison, SimulatedEvaluationService};
pub use generation::{
    parse_guideline_proposals, GenerationPurpose, GenerationRequest, GenerationResult,
    GenerationService, ProposalParse, SimulatedGenerationService,
};
pub use guidelines::{GuidelinesStore, InMemoryGuidelinesStore};
pub use stats::{FixedShadowStats, ShadowStatsSource};
pub use tasks::{InMemoryTaskStore, TaskStore};
pub use tenants::{InMemoryTenantStore, TenantStore};
