//! Error types for store operations.

use std::path::PathBuf;

/// Errors that can occur while writing the analysis store.
///
/// Reads never produce these: a read problem is a cache miss, not an error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred while writing the store file.
    #[error("store I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The analysis could not be serialized.
    #[error("store serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
