//! Turns compiled frontend output into the engine's durable dependency data.
//!
//! Two extractors run over every freshly compiled unit: the
//! [`DependencyExtractor`] classifies references into typed edges, and the
//! [`NameHasher`] computes the per-identifier structural hashes that let
//! member-reference edges propagate selectively.

#![warn(missing_docs)]

pub mod extract;
pub mod names;
pub mod output;

pub use extract::{ClassLookup, DependencyExtractor};
pub use names::NameHasher;
pub use output::{ClassFragment, CompiledClass, CompiledUnit};
