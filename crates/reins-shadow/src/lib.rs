//! Reins Shadow - the watch-and-learn loop.
//!
//! While a tenant is in shadow mode the humans keep working normally; the
//! engine captures what they do, asks the agent for an independent
//! alternative in the background, scores the two against each other, and
//! aggregates recurring divergences into guideline-update proposals.
//!
//! Capture is synchronous and cheap. Generation and comparison run on
//! detached tasks; a pipeline failure is logged and leaves the interaction
//! pending, it never surfaces to the capture caller.

#![deny(unsafe_code)]

pub mod comparator;
pub mod error;
pub mod learning;
pub mod manager;

pub use comparator::Comparator;
pub use error::ShadowError;
pub use learning::LearningAggregator;
pub use manager::SessionManager;
