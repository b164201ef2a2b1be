//! Error types for bridge cache operations.

use std::path::PathBuf;

/// Errors that can occur while obtaining a bridge adapter.
///
/// All of these are fatal for the requested version: no compilation may be
/// attempted without a bridge, and a failed fetch or build leaves no partial
/// artifact in the cache.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// An I/O error occurred in the cache directories.
    #[error("bridge cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The frontend distribution for the requested version could not be
    /// resolved.
    #[error("failed to resolve compiler frontend {version}: {reason}")]
    Resolve {
        /// The requested compiler version.
        version: String,
        /// Description of the resolution failure.
        reason: String,
    },

    /// The bridge adapter could not be built from the resolved distribution.
    #[error("failed to build bridge for compiler {version}: {reason}")]
    Build {
        /// The requested compiler version.
        version: String,
        /// Description of the build failure.
        reason: String,
    },
}
