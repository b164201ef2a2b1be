//! File stamps: cheap, comparable fingerprints used for change detection.
//!
//! Stamps are compared only for equality against the previous cycle's value.
//! They carry no ordering; a "newer" modification time is not meaningful to
//! the engine, only "different".

use std::path::Path;
use std::time::UNIX_EPOCH;

use kiln_common::ContentHash;
use serde::{Deserialize, Serialize};

/// A point-in-time fingerprint of one tracked file.
///
/// Two stamps of different variants never compare equal, so switching a
/// file's stamping policy between cycles conservatively reads as a change.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Stamp {
    /// Modification time in milliseconds since the Unix epoch. Used for
    /// classpath entries where content hashing is prohibitive.
    LastModified(u64),
    /// Content hash of the file's bytes. Used for project sources and
    /// produced outputs, stable across checkouts with differing timestamps.
    ContentHash(ContentHash),
    /// Bare existence check for entries where even a metadata read is
    /// unnecessary.
    Exists(bool),
    /// The file was expected but could not be read. The invalidation engine
    /// treats a current `Missing` stamp as changed unconditionally, so a
    /// vanished file invalidates every cycle until it reappears or leaves
    /// the tracked set.
    Missing,
}

impl Stamp {
    /// Returns `true` if this stamp marks a vanished file.
    pub fn is_missing(&self) -> bool {
        matches!(self, Stamp::Missing)
    }
}

/// Computes one [`Stamp`] per tracked file.
///
/// Policy differs by role: project sources and produced outputs get
/// content-grade stamps; classpath entries get a cheap modification-time
/// stamp because entry count and size make hashing prohibitive. A missing
/// file yields [`Stamp::Missing`] rather than an error.
pub struct Stamper;

impl Stamper {
    /// Stamps a project source file by content hash.
    pub fn source(path: &Path) -> Stamp {
        match std::fs::read(path) {
            Ok(bytes) => Stamp::ContentHash(ContentHash::from_bytes(&bytes)),
            Err(_) => Stamp::Missing,
        }
    }

    /// Stamps a classpath entry by modification time.
    ///
    /// Falls back to [`Stamp::Exists`] on filesystems that do not report
    /// modification times.
    pub fn classpath_entry(path: &Path) -> Stamp {
        let Ok(meta) = std::fs::metadata(path) else {
            return Stamp::Missing;
        };
        match meta.modified() {
            Ok(mtime) => match mtime.duration_since(UNIX_EPOCH) {
                Ok(d) => Stamp::LastModified(d.as_millis() as u64),
                Err(_) => Stamp::Exists(true),
            },
            Err(_) => Stamp::Exists(true),
        }
    }

    /// Stamps a produced output file by content hash.
    pub fn output(path: &Path) -> Stamp {
        Self::source(path)
    }
}
