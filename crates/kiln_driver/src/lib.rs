//! The build-cycle driver for the Kiln incremental compilation engine.
//!
//! One cycle runs as a sequential pipeline: stamp everything, ask the
//! invalidation engine for the recompilation set, feed pending units to the
//! frontend round by round while the set grows, merge fresh results into a
//! copy of the previous analysis, and persist the snapshot atomically. The
//! frontend itself lives behind the [`Frontend`] trait; this crate never
//! interprets source code.

#![warn(missing_docs)]

pub mod config;
pub mod driver;
pub mod error;
pub mod frontend;

pub use config::{CompileConfig, SourceEntry};
pub use driver::{CompileEngine, CompileResult};
pub use error::{DriverError, FrontendError};
pub use frontend::{CompileOrder, CompileOutput, CompileProgress, Frontend, NoProgress};
