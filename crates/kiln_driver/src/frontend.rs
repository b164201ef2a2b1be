//! Collaborator interfaces between the driver and external compilers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use kiln_analysis::{SourceUnit, UnitId};
use kiln_diagnostics::DiagnosticSink;
use kiln_extract::CompiledUnit;

use crate::error::FrontendError;

/// Order in which pending units are handed to the frontend within a round.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum CompileOrder {
    /// Units in their natural (path) order, flavors interleaved.
    #[default]
    Mixed,
    /// All primary-flavor units before support-flavor units.
    PrimaryFirst,
    /// All support-flavor units before primary-flavor units.
    SupportFirst,
}

/// Per-unit progress reporting and cooperative cancellation.
///
/// Cancellation is checked between units, never mid-unit: when
/// [`advance`](Self::advance) returns `false`, no further units are
/// submitted, partial results are discarded, and the previous analysis
/// stays authoritative on disk.
pub trait CompileProgress {
    /// Called when a unit is about to compile.
    fn entering(&mut self, unit: &UnitId);

    /// Called after each unit. Returning `false` requests cancellation.
    fn advance(&mut self, current: usize, total: usize) -> bool;
}

/// A progress sink that reports nothing and never cancels.
pub struct NoProgress;

impl CompileProgress for NoProgress {
    fn entering(&mut self, _unit: &UnitId) {}

    fn advance(&mut self, _current: usize, _total: usize) -> bool {
        true
    }
}

/// What one frontend round produced.
#[derive(Debug)]
pub struct CompileOutput {
    /// Compiled output per submitted unit, in submission order. May be
    /// shorter than the submission when the round was cancelled.
    pub units: Vec<CompiledUnit>,
    /// `true` when the progress hook requested cancellation mid-round.
    pub cancelled: bool,
}

/// An external compiler behind a uniform interface.
///
/// Invoked at most once per expansion round with exactly the pending units.
/// Compile errors and warnings go into the sink; a `FrontendError` return is
/// reserved for the frontend failing to run at all.
pub trait Frontend {
    /// Compiles the given units against the full classpath.
    ///
    /// Implementations call `progress.entering` before each unit and
    /// `progress.advance` after it, stopping early with a `cancelled`
    /// output when `advance` returns `false`.
    fn compile(
        &mut self,
        units: &[SourceUnit],
        classpath: &[PathBuf],
        options: &[String],
        sink: &DiagnosticSink,
        progress: &mut dyn CompileProgress,
    ) -> Result<CompileOutput, FrontendError>;
}
