//! Version-keyed cache of compiler-bridge adapter artifacts.
//!
//! A bridge adapter lets the engine drive one particular compiler-frontend
//! release. Building one is expensive (resolve a distribution, compile the
//! adapter against it), so results are cached per version, with an exclusive
//! cross-process file lock serializing the fetch+build so concurrent build
//! processes on one machine never duplicate the work.

#![warn(missing_docs)]

pub mod error;
pub mod lock;
pub mod manager;
pub mod resolver;

pub use error::BridgeError;
pub use lock::CacheLock;
pub use manager::BridgeComponentManager;
pub use resolver::{ArtifactResolver, BridgeBuilder};
