//! Fixpoint invalidation over the dependency graph.
//!
//! Given the previous cycle's analysis and the current stamps, computes
//! exactly which units must be recompiled. Propagation is monotone: the set
//! only grows, so cyclic dependencies saturate instead of looping.

#![warn(missing_docs)]

pub mod diff;
pub mod engine;

pub use diff::ApiDiff;
pub use engine::{Invalidation, InvalidationEngine, Phase};
