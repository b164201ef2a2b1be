//! Collaborator traits for fetching and building bridge adapters.

use std::path::{Path, PathBuf};

/// Resolves a compiler-frontend distribution to local file paths.
///
/// The network side of resolution is outside this engine; implementations
/// typically delegate to a dependency manager's offline or online resolver.
pub trait ArtifactResolver: Send + Sync {
    /// Resolves the distribution for `version`, returning the local paths
    /// of its artifacts.
    fn resolve(&self, version: &str) -> Result<Vec<PathBuf>, String>;
}

/// Builds a bridge adapter from a resolved distribution.
pub trait BridgeBuilder: Send + Sync {
    /// Builds the adapter from `distribution` into `dest`.
    ///
    /// `dest` exists and is empty when called; on success it holds the
    /// complete, ready-to-use adapter.
    fn build(&self, distribution: &[PathBuf], dest: &Path) -> Result<(), String>;
}
