//! Reins Escalation - the per-action approval gate.
//!
//! This crate decides, for every effectful agent action, whether a human
//! must sign off first. It combines two layers:
//!
//! - **Level registry** ([`LevelRegistry`]): what each autonomy level may do
//!   at all, and which task classes it must always escalate.
//! - **Escalation rules** ([`EscalationRule`]): content- and context-driven
//!   predicates that force approval regardless of level, unless the level is
//!   explicitly trusted to skip them.
//!
//! Evaluation ([`EscalationEngine::requires_approval`]) is pure given
//! `(level, rules, context)`: no clocks, no I/O, no hidden state. That makes
//! it safe to call from hot paths and trivial to unit test.

#![deny(unsafe_code)]

pub mod engine;
pub mod registry;
pub mod rules;

pub use engine::{ApprovalCheck, EscalationEngine};
pub use registry::LevelRegistry;
pub use rules::{default_rules, EscalationRule, RuleAction, RuleCondition};
