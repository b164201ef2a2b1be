//! Source unit identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::stamp::Stamp;

/// Identity of one compilable source unit, path-like within the project.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(PathBuf);

impl UnitId {
    /// Creates a unit id from a path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Returns the underlying path.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0.display())
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self(PathBuf::from(s))
    }
}

impl From<PathBuf> for UnitId {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// Which frontend a source unit belongs to, for compile-order policies that
/// feed one flavor before the other.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SourceKind {
    /// Handled by the primary frontend.
    Primary,
    /// Handled by the supporting frontend.
    Support,
}

/// One compilable source item: identity, current stamp, and the class names
/// it produced the last time it compiled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceUnit {
    /// The unit's identity.
    pub id: UnitId,
    /// Which frontend flavor compiles this unit.
    pub kind: SourceKind,
    /// The unit's stamp at discovery time.
    pub stamp: Stamp,
}
