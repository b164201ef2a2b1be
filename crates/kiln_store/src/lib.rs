//! Durable persistence for [`Analysis`](kiln_analysis::Analysis) snapshots.
//!
//! The store writes one framed binary file per build: a validated header
//! (magic bytes, format version, engine version, checksum) followed by a
//! bincode payload. Writes are atomic via a temp-then-rename discipline, and
//! all reads are fail-safe: corruption or version mismatches degrade to
//! "no previous analysis", which funnels into a full rebuild.

#![warn(missing_docs)]

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::AnalysisStore;
