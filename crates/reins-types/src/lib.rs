//! Reins Types - shared data model for autonomy governance
//!
//! This crate defines the domain types for graduated agent autonomy:
//! levels and their capability descriptors, escalation contexts, transition
//! records, windowed metrics, shadow sessions, captured interactions, and
//! learning artifacts.
//!
//! This is a pure types crate with no runtime dependencies. All types
//! implement `Clone`, `Debug`, `Serialize`, `Deserialize`. IDs use the
//! newtype pattern and implement `Display`, `generate()`, and `new()`.

#![deny(unsafe_code)]

mod context;
mod ids;
mod interaction;
mod learning;
mod level;
mod metrics;
mod session;
mod task;
mod transition;

pub use context::*;
pub use ids::*;
pub use interaction::*;
pub use learning::*;
pub use level::*;
pub use metrics::*;
pub use session::*;
pub use task::*;
pub use transition::*;
