//! Durable build-state model for the Kiln incremental compilation engine.
//!
//! This crate defines the data that survives between build cycles: file
//! stamps, per-class API surfaces, name hashes, and the typed dependency
//! graph, all aggregated into an immutable [`Analysis`] snapshot. It also
//! provides the [`Stamper`] that computes comparable file fingerprints.

#![warn(missing_docs)]

pub mod analysis;
pub mod api;
pub mod edge;
pub mod setup;
pub mod stamp;
pub mod unit;

pub use analysis::{Analysis, PreviousResult};
pub use api::{ClassApi, ClassName, MemberSignature};
pub use edge::{DependencyEdge, DependencyKind, EdgeTarget};
pub use setup::SetupFingerprint;
pub use stamp::{Stamp, Stamper};
pub use unit::{SourceKind, SourceUnit, UnitId};
