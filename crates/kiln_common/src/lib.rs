//! Shared foundational types used across the Kiln build engine.
//!
//! This crate provides the content hash type used for stamps, name hashes,
//! and store checksums, plus the common result types for internal errors.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::ContentHash;
pub use result::{InternalError, KilnResult};
