//! Typed dependency edges between compiled units.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::unit::UnitId;

/// How a dependency propagates invalidation.
///
/// A closed variant dispatched by value inside the invalidation engine,
/// keeping the propagation rule table-driven and exhaustively checkable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum DependencyKind {
    /// A reference to a member of another unit. Propagates only when a
    /// used-name hash on the target changed.
    MemberReference,
    /// The target is a supertype or interface of the compiling unit.
    /// Propagates unconditionally.
    Inheritance,
    /// Inheritance realized through a local or anonymous subclass.
    /// Propagation-equivalent to [`Inheritance`](DependencyKind::Inheritance)
    /// but tracked separately for reporting.
    LocalInheritance,
}

impl DependencyKind {
    /// Returns `true` for the kinds that propagate invalidation
    /// unconditionally.
    pub fn propagates_unconditionally(self) -> bool {
        match self {
            DependencyKind::Inheritance | DependencyKind::LocalInheritance => true,
            DependencyKind::MemberReference => false,
        }
    }
}

/// What a dependency edge points at.
///
/// External targets only have stamps available for comparison, never a
/// [`ClassApi`](crate::api::ClassApi).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum EdgeTarget {
    /// Another unit in the same project.
    Unit(UnitId),
    /// A classpath entry outside the project.
    Classpath(PathBuf),
}

/// A directed dependency relation recorded by the extractor.
///
/// Edges for a unit are fully replaced when that unit recompiles.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The depending unit.
    pub from: UnitId,
    /// The depended-upon target.
    pub to: EdgeTarget,
    /// How the dependency propagates invalidation.
    pub kind: DependencyKind,
}
