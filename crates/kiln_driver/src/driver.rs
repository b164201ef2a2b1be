//! The per-cycle compile engine.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use kiln_analysis::{
    Analysis, ClassApi, PreviousResult, SetupFingerprint, SourceKind, SourceUnit, Stamp, Stamper,
    UnitId,
};
use kiln_diagnostics::{Diagnostic, DiagnosticSink};
use kiln_extract::{ClassLookup, DependencyExtractor, NameHasher};
use kiln_invalidate::{ApiDiff, InvalidationEngine};
use kiln_store::AnalysisStore;

use crate::config::CompileConfig;
use crate::error::DriverError;
use crate::frontend::{CompileOrder, CompileProgress, Frontend};

/// The outcome of one build cycle.
#[derive(Debug)]
pub struct CompileResult {
    /// `false` when the cycle failed (error threshold exceeded) or was
    /// cancelled. A failed cycle's analysis is the previous one.
    pub success: bool,
    /// `true` when the progress hook requested cancellation.
    pub cancelled: bool,
    /// The authoritative analysis after this cycle: the freshly merged one
    /// on success, the previous one on failure or cancellation.
    pub analysis: Analysis,
    /// The setup fingerprint the analysis belongs to.
    pub setup: SetupFingerprint,
    /// All diagnostics emitted during the cycle.
    pub diagnostics: Vec<Diagnostic>,
    /// Every unit the frontend compiled this cycle. Empty on the skip fast
    /// path. After cancellation or a failed cycle, units from completed
    /// rounds remain listed even though their merged results were discarded.
    pub compiled_units: BTreeSet<UnitId>,
}

/// Runs build cycles: invalidation, frontend rounds, merge, persistence.
pub struct CompileEngine {
    store: AnalysisStore,
}

impl CompileEngine {
    /// Creates an engine persisting through the given store.
    pub fn new(store: AnalysisStore) -> Self {
        Self { store }
    }

    /// Returns the underlying analysis store.
    pub fn store(&self) -> &AnalysisStore {
        &self.store
    }

    /// Loads the previous cycle's result from the store and runs one cycle.
    ///
    /// An unreadable store degrades to a cold start with a warning
    /// diagnostic in the cycle's result.
    pub fn cycle(
        &self,
        config: &CompileConfig,
        frontend: &mut dyn Frontend,
        progress: &mut dyn CompileProgress,
    ) -> Result<CompileResult, DriverError> {
        let sink = DiagnosticSink::new();
        let previous = match self.store.get() {
            Some((analysis, setup)) => PreviousResult::Previous { analysis, setup },
            None => {
                if self.store.path().exists() {
                    sink.emit(Diagnostic::warning(format!(
                        "analysis store at {} is unreadable, performing a full rebuild",
                        self.store.path().display()
                    )));
                }
                PreviousResult::NoPrevious
            }
        };
        self.run_cycle(config, &previous, frontend, progress, sink)
    }

    /// Runs one cycle against an explicitly supplied previous result.
    pub fn run(
        &self,
        config: &CompileConfig,
        previous: &PreviousResult,
        frontend: &mut dyn Frontend,
        progress: &mut dyn CompileProgress,
    ) -> Result<CompileResult, DriverError> {
        self.run_cycle(config, previous, frontend, progress, DiagnosticSink::new())
    }

    fn run_cycle(
        &self,
        config: &CompileConfig,
        previous: &PreviousResult,
        frontend: &mut dyn Frontend,
        progress: &mut dyn CompileProgress,
        sink: DiagnosticSink,
    ) -> Result<CompileResult, DriverError> {
        let setup = config.setup_fingerprint();

        let mut kinds: BTreeMap<UnitId, SourceKind> = BTreeMap::new();
        let mut source_stamps: BTreeMap<UnitId, Stamp> = BTreeMap::new();
        for entry in &config.sources {
            kinds.insert(entry.id.clone(), entry.kind);
            source_stamps.insert(entry.id.clone(), Stamper::source(entry.id.path()));
        }
        let classpath_stamps: BTreeMap<PathBuf, Stamp> = config
            .classpath
            .iter()
            .map(|entry| (entry.clone(), Stamper::classpath_entry(entry)))
            .collect();

        let invalidation =
            InvalidationEngine::compute(previous, &source_stamps, &classpath_stamps, setup);

        // Skip fast path: nothing changed, the previous result stands and
        // neither the frontend nor the store is touched. A changed setup
        // never skips, even when the recompilation set is empty (a project
        // with no sources still has to persist the new fingerprint).
        if invalidation.is_empty() {
            if let PreviousResult::Previous {
                analysis,
                setup: prev_setup,
            } = previous
            {
                if *prev_setup == setup {
                    return Ok(CompileResult {
                        success: true,
                        cancelled: false,
                        analysis: analysis.clone(),
                        setup: *prev_setup,
                        diagnostics: sink.take_all(),
                        compiled_units: BTreeSet::new(),
                    });
                }
            }
        }

        let mut merged = if invalidation.full_rebuild {
            Analysis::empty(setup)
        } else {
            let mut analysis = previous
                .analysis()
                .cloned()
                .unwrap_or_else(|| Analysis::empty(setup));
            for unit in &invalidation.invalidated {
                analysis.drop_unit(unit);
            }
            analysis
        };
        merged.setup = setup;
        merged.classpath_stamps = classpath_stamps;

        // Removed units never compile; everything else invalidated does.
        let mut pending: BTreeSet<UnitId> = invalidation
            .invalidated
            .iter()
            .filter(|unit| source_stamps.contains_key(*unit))
            .cloned()
            .collect();
        let mut already = invalidation.invalidated;
        let mut compiled = BTreeSet::new();

        while !pending.is_empty() {
            let units = Self::ordered(&pending, &kinds, &source_stamps, config.order);
            let output =
                frontend.compile(&units, &config.classpath, &config.options, &sink, progress)?;

            if output.cancelled {
                // Discard everything from this cycle; the previous analysis
                // stays authoritative on disk.
                return Ok(CompileResult {
                    success: false,
                    cancelled: true,
                    analysis: previous
                        .analysis()
                        .cloned()
                        .unwrap_or_else(|| Analysis::empty(setup)),
                    setup: previous.setup().unwrap_or(setup),
                    diagnostics: sink.take_all(),
                    compiled_units: compiled,
                });
            }

            // Drop stale entries before indexing fresh classes; drop_unit
            // clears a unit's class index entries along with everything else.
            for out in &output.units {
                merged.drop_unit(&out.unit);
            }
            for out in &output.units {
                for name in out.class_names() {
                    merged.class_origins.insert(name, out.unit.clone());
                }
            }

            let project_index = merged.class_origins.clone();
            let lookup = ClassLookup::new(&project_index, &config.classpath_classes);

            let mut diff = ApiDiff::new();
            for out in &output.units {
                let stamp = source_stamps
                    .get(&out.unit)
                    .copied()
                    .unwrap_or(Stamp::Missing);
                let apis: Vec<ClassApi> = out.parsed_classes().map(|c| c.api.clone()).collect();
                let hashes = NameHasher::hash_unit(apis.iter());
                let used = NameHasher::used_names(apis.iter());
                let edges = DependencyExtractor::extract(out, &lookup, &sink);

                let old = previous
                    .analysis()
                    .and_then(|prev| prev.name_hashes.get(&out.unit));
                diff.record(out.unit.clone(), old, &hashes);

                merged.source_stamps.insert(out.unit.clone(), stamp);
                merged.apis.insert(out.unit.clone(), apis);
                merged.name_hashes.insert(out.unit.clone(), hashes);
                merged.used_names.insert(out.unit.clone(), used);
                merged.edges.extend(edges);
                compiled.insert(out.unit.clone());
            }

            // Grow the set from the fresh API diff. Monotone: `already` only
            // ever gains members, so the round loop terminates.
            pending = match previous.analysis() {
                Some(prev) if !diff.is_empty() => {
                    let additions = InvalidationEngine::expand(prev, &diff, &already);
                    already.extend(additions.iter().cloned());
                    additions
                }
                _ => BTreeSet::new(),
            };
        }

        if sink.error_count() > config.max_errors {
            return Ok(CompileResult {
                success: false,
                cancelled: false,
                analysis: previous
                    .analysis()
                    .cloned()
                    .unwrap_or_else(|| Analysis::empty(setup)),
                setup: previous.setup().unwrap_or(setup),
                diagnostics: sink.take_all(),
                compiled_units: compiled,
            });
        }

        self.store.set(&merged, setup)?;
        Ok(CompileResult {
            success: true,
            cancelled: false,
            analysis: merged,
            setup,
            diagnostics: sink.take_all(),
            compiled_units: compiled,
        })
    }

    fn ordered(
        pending: &BTreeSet<UnitId>,
        kinds: &BTreeMap<UnitId, SourceKind>,
        stamps: &BTreeMap<UnitId, Stamp>,
        order: CompileOrder,
    ) -> Vec<SourceUnit> {
        let mut units: Vec<SourceUnit> = pending
            .iter()
            .map(|unit| SourceUnit {
                id: unit.clone(),
                kind: kinds.get(unit).copied().unwrap_or(SourceKind::Primary),
                stamp: stamps.get(unit).copied().unwrap_or(Stamp::Missing),
            })
            .collect();
        // Stable sorts keep path order within each flavor.
        match order {
            CompileOrder::Mixed => {}
            CompileOrder::PrimaryFirst => {
                units.sort_by_key(|u| matches!(u.kind, SourceKind::Support));
            }
            CompileOrder::SupportFirst => {
                units.sort_by_key(|u| matches!(u.kind, SourceKind::Primary));
            }
        }
        units
    }
}
