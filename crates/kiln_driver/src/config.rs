//! Per-cycle build configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use kiln_analysis::{ClassName, SetupFingerprint, SourceKind, UnitId};

use crate::frontend::CompileOrder;

/// Default cap on error-severity diagnostics before a cycle fails.
pub const DEFAULT_MAX_ERRORS: usize = 100;

/// One source unit as declared by the caller: identity plus frontend flavor.
///
/// The driver stamps the unit itself; callers never supply stamps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceEntry {
    /// The unit's identity.
    pub id: UnitId,
    /// Which frontend flavor compiles this unit.
    pub kind: SourceKind,
}

impl SourceEntry {
    /// Creates a source entry.
    pub fn new(id: impl Into<UnitId>, kind: SourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// Everything one build cycle needs to know about the project.
///
/// `classpath_classes` maps each externally defined class name to the
/// classpath entry that provides it; every value must also appear in
/// `classpath` so that extracted edges always point at a stamped entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompileConfig {
    /// All source units of the project.
    pub sources: Vec<SourceEntry>,
    /// All classpath entries, stamped each cycle.
    pub classpath: Vec<PathBuf>,
    /// Class-name index of the classpath, for edge extraction.
    pub classpath_classes: BTreeMap<ClassName, PathBuf>,
    /// Where compiled output lands. Part of the setup fingerprint.
    pub output_dir: PathBuf,
    /// Compiler options, passed through to the frontend verbatim.
    pub options: Vec<String>,
    /// Error-severity diagnostics above this count fail the cycle.
    pub max_errors: usize,
    /// Order in which pending units are handed to the frontend.
    pub order: CompileOrder,
}

impl CompileConfig {
    /// Creates a configuration with no sources, no classpath, default error
    /// threshold, and mixed compile order.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            sources: Vec::new(),
            classpath: Vec::new(),
            classpath_classes: BTreeMap::new(),
            output_dir: output_dir.into(),
            options: Vec::new(),
            max_errors: DEFAULT_MAX_ERRORS,
            order: CompileOrder::Mixed,
        }
    }

    /// Computes the setup fingerprint of this configuration.
    ///
    /// Covers options, classpath, and output location. Sources are not part
    /// of the fingerprint; source changes flow through stamps instead.
    pub fn setup_fingerprint(&self) -> SetupFingerprint {
        SetupFingerprint::compute(&self.options, &self.classpath, &self.output_dir)
    }
}
