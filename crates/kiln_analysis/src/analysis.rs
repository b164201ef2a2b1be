//! The durable snapshot of one successful build cycle.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use kiln_common::{ContentHash, InternalError, KilnResult};

use crate::api::{ClassApi, ClassName};
use crate::edge::{DependencyEdge, EdgeTarget};
use crate::setup::SetupFingerprint;
use crate::stamp::Stamp;
use crate::unit::UnitId;

/// Immutable snapshot of build state produced by one successful cycle.
///
/// Holds stamps for every tracked source and classpath entry, the structural
/// API and name hashes of every compiled unit, and the typed dependency
/// graph between units. Replaced wholesale after each successful cycle and
/// discarded on a failed one.
///
/// Maps are `BTreeMap`s so that serialization and iteration order are
/// deterministic across processes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Stamp of every tracked source unit.
    pub source_stamps: BTreeMap<UnitId, Stamp>,
    /// Stamp of every classpath entry.
    pub classpath_stamps: BTreeMap<PathBuf, Stamp>,
    /// API surfaces of the classes each unit produced.
    pub apis: BTreeMap<UnitId, Vec<ClassApi>>,
    /// Per-unit hash of each defined name's structural signature.
    pub name_hashes: BTreeMap<UnitId, BTreeMap<String, ContentHash>>,
    /// Per-unit set of identifiers the unit references anywhere.
    pub used_names: BTreeMap<UnitId, BTreeSet<String>>,
    /// All recorded dependency edges.
    pub edges: Vec<DependencyEdge>,
    /// Which unit produced each known class name.
    pub class_origins: BTreeMap<ClassName, UnitId>,
    /// Fingerprint of the setup that produced this analysis.
    pub setup: SetupFingerprint,
}

impl Analysis {
    /// Creates an empty analysis for a cold start.
    pub fn empty(setup: SetupFingerprint) -> Self {
        Self {
            source_stamps: BTreeMap::new(),
            classpath_stamps: BTreeMap::new(),
            apis: BTreeMap::new(),
            name_hashes: BTreeMap::new(),
            used_names: BTreeMap::new(),
            edges: Vec::new(),
            class_origins: BTreeMap::new(),
            setup,
        }
    }

    /// Drops every entry belonging to `unit`: its stamp, API, name hashes,
    /// used names, outgoing edges, and class index entries.
    ///
    /// Called for each invalidated unit before fresh results are merged in,
    /// and for removed units that will get no fresh results.
    pub fn drop_unit(&mut self, unit: &UnitId) {
        self.source_stamps.remove(unit);
        self.apis.remove(unit);
        self.name_hashes.remove(unit);
        self.used_names.remove(unit);
        self.edges.retain(|e| &e.from != unit);
        self.class_origins.retain(|_, origin| origin != unit);
    }

    /// Returns every unit that holds at least one edge to `unit`.
    pub fn dependents_of(&self, unit: &UnitId) -> BTreeSet<UnitId> {
        self.edges
            .iter()
            .filter(|e| matches!(&e.to, EdgeTarget::Unit(u) if u == unit))
            .map(|e| e.from.clone())
            .collect()
    }

    /// Checks the structural invariant that every edge endpoint references
    /// a stamp present in this analysis.
    pub fn validate(&self) -> KilnResult<()> {
        for edge in &self.edges {
            if !self.source_stamps.contains_key(&edge.from) {
                return Err(InternalError::new(format!(
                    "edge from unstamped unit {}",
                    edge.from
                )));
            }
            match &edge.to {
                EdgeTarget::Unit(u) => {
                    if !self.source_stamps.contains_key(u) {
                        return Err(InternalError::new(format!(
                            "edge to unstamped unit {u}"
                        )));
                    }
                }
                EdgeTarget::Classpath(p) => {
                    if !self.classpath_stamps.contains_key(p) {
                        return Err(InternalError::new(format!(
                            "edge to unstamped classpath entry {}",
                            p.display()
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// The previous cycle's result, or the explicit absence of one.
///
/// An explicit sum type rather than a nullable value so that callers cannot
/// forget the cold-start branch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PreviousResult {
    /// No previous successful cycle exists; everything compiles.
    NoPrevious,
    /// The analysis and setup fingerprint of the previous successful cycle.
    Previous {
        /// The previous cycle's analysis snapshot.
        analysis: Analysis,
        /// The setup fingerprint recorded with it.
        setup: SetupFingerprint,
    },
}

impl PreviousResult {
    /// Returns the previous analysis, if one exists.
    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            PreviousResult::NoPrevious => None,
            PreviousResult::Previous { analysis, .. } => Some(analysis),
        }
    }

    /// Returns the previous setup fingerprint, if one exists.
    pub fn setup(&self) -> Option<SetupFingerprint> {
        match self {
            PreviousResult::NoPrevious => None,
            PreviousResult::Previous { setup, .. } => Some(*setup),
        }
    }
}
