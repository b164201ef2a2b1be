//! Compile-setup fingerprinting.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use kiln_common::ContentHash;

/// A fingerprint of everything about a build's configuration that, when
/// changed, invalidates all previous analysis: compiler options, the
/// classpath, and the output location.
///
/// Compared only for equality; any difference forces a full rebuild.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SetupFingerprint(ContentHash);

impl SetupFingerprint {
    /// Computes a fingerprint over the canonicalized setup inputs.
    ///
    /// The inputs are joined with `\0` separators so that option and path
    /// boundaries cannot alias (`["-a", "b"]` vs `["-ab"]`).
    pub fn compute(options: &[String], classpath: &[PathBuf], output: &Path) -> Self {
        let mut buf = Vec::new();
        for opt in options {
            buf.extend_from_slice(opt.as_bytes());
            buf.push(0);
        }
        buf.push(0);
        for entry in classpath {
            buf.extend_from_slice(entry.to_string_lossy().as_bytes());
            buf.push(0);
        }
        buf.push(0);
        buf.extend_from_slice(output.to_string_lossy().as_bytes());
        Self(ContentHash::from_bytes(&buf))
    }
}
