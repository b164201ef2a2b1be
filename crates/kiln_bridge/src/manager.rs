//! The bridge component cache manager.

use std::path::{Path, PathBuf};

use crate::error::BridgeError;
use crate::lock::CacheLock;
use crate::resolver::{ArtifactResolver, BridgeBuilder};

/// Resolves, builds, and caches one bridge adapter per compiler version.
///
/// Lookup order: local cache, shared secondary cache, then fetch+build
/// under an exclusive per-version file lock. A second process requesting
/// the same version while the lock is held blocks and, on release,
/// observes the now-populated cache instead of duplicating the work.
pub struct BridgeComponentManager {
    /// Local cache root; each version gets one subdirectory.
    local: PathBuf,
    /// Optional shared read-only secondary cache.
    shared: Option<PathBuf>,
    resolver: Box<dyn ArtifactResolver>,
    builder: Box<dyn BridgeBuilder>,
}

impl BridgeComponentManager {
    /// Creates a manager over the given cache directories and collaborators.
    pub fn new(
        local: impl Into<PathBuf>,
        shared: Option<PathBuf>,
        resolver: Box<dyn ArtifactResolver>,
        builder: Box<dyn BridgeBuilder>,
    ) -> Self {
        Self {
            local: local.into(),
            shared,
            resolver,
            builder,
        }
    }

    /// Returns the cache slot directory for a version.
    pub fn slot(&self, version: &str) -> PathBuf {
        self.local.join(version)
    }

    /// Returns a ready-to-use bridge adapter directory for `version`,
    /// fetching and building it if no cache holds one yet.
    ///
    /// Failure to resolve or build is fatal for this version request and
    /// leaves no partial artifact in the cache; the lock is released on
    /// every exit path.
    pub fn bridge(&self, version: &str) -> Result<PathBuf, BridgeError> {
        let slot = self.slot(version);
        if slot.is_dir() {
            return Ok(slot);
        }

        if let Some(found) = self.probe_shared(version)? {
            return Ok(found);
        }

        std::fs::create_dir_all(&self.local).map_err(|e| BridgeError::Io {
            path: self.local.clone(),
            source: e,
        })?;
        let lock_path = self.local.join(format!("{version}.lock"));
        let _lock = CacheLock::acquire(&lock_path).map_err(|e| BridgeError::Io {
            path: lock_path.clone(),
            source: e,
        })?;

        // Whoever held the lock before us may have installed the slot.
        if slot.is_dir() {
            return Ok(slot);
        }

        let distribution =
            self.resolver
                .resolve(version)
                .map_err(|reason| BridgeError::Resolve {
                    version: version.to_string(),
                    reason,
                })?;

        let staging = self.local.join(format!(".{version}.staging"));
        if staging.exists() {
            // Leftover from a crashed builder; the lock makes removal safe.
            std::fs::remove_dir_all(&staging).map_err(|e| BridgeError::Io {
                path: staging.clone(),
                source: e,
            })?;
        }
        std::fs::create_dir_all(&staging).map_err(|e| BridgeError::Io {
            path: staging.clone(),
            source: e,
        })?;

        if let Err(reason) = self.builder.build(&distribution, &staging) {
            let _ = std::fs::remove_dir_all(&staging);
            return Err(BridgeError::Build {
                version: version.to_string(),
                reason,
            });
        }

        std::fs::rename(&staging, &slot).map_err(|e| BridgeError::Io {
            path: slot.clone(),
            source: e,
        })?;
        Ok(slot)
    }

    /// Copies a shared-cache hit into the local cache, if one exists.
    fn probe_shared(&self, version: &str) -> Result<Option<PathBuf>, BridgeError> {
        let Some(shared) = &self.shared else {
            return Ok(None);
        };
        let shared_slot = shared.join(version);
        if !shared_slot.is_dir() {
            return Ok(None);
        }

        std::fs::create_dir_all(&self.local).map_err(|e| BridgeError::Io {
            path: self.local.clone(),
            source: e,
        })?;
        let lock_path = self.local.join(format!("{version}.lock"));
        let _lock = CacheLock::acquire(&lock_path).map_err(|e| BridgeError::Io {
            path: lock_path.clone(),
            source: e,
        })?;

        let slot = self.slot(version);
        if slot.is_dir() {
            return Ok(Some(slot));
        }

        let staging = self.local.join(format!(".{version}.staging"));
        if staging.exists() {
            std::fs::remove_dir_all(&staging).map_err(|e| BridgeError::Io {
                path: staging.clone(),
                source: e,
            })?;
        }
        copy_dir(&shared_slot, &staging)?;
        std::fs::rename(&staging, &slot).map_err(|e| BridgeError::Io {
            path: slot.clone(),
            source: e,
        })?;
        Ok(Some(slot))
    }
}

/// Recursively copies a directory tree.
fn copy_dir(src: &Path, dst: &Path) -> Result<(), BridgeError> {
    std::fs::create_dir_all(dst).map_err(|e| BridgeError::Io {
        path: dst.to_path_buf(),
        source: e,
    })?;
    let entries = std::fs::read_dir(src).map_err(|e| BridgeError::Io {
        path: src.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| BridgeError::Io {
            path: src.to_path_buf(),
            source: e,
        })?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if from.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            std::fs::copy(&from, &to).map_err(|e| BridgeError::Io {
                path: from.clone(),
                source: e,
            })?;
        }
    }
    Ok(())
}
