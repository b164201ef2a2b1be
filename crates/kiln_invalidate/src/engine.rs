//! The invalidation engine: `Initial → Direct → Transitive → Fixed`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use kiln_analysis::{
    Analysis, DependencyKind, EdgeTarget, PreviousResult, SetupFingerprint, Stamp, UnitId,
};

use crate::diff::ApiDiff;

/// The phases the engine walks through while computing a recompilation set.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Stamp comparison: changed, added, and removed sources.
    Initial,
    /// Setup fingerprint and classpath stamp comparison.
    Direct,
    /// Fixpoint expansion over dependency edges.
    Transitive,
    /// The accumulated set is the cycle's recompilation set.
    Fixed,
}

/// The result of one invalidation computation.
#[derive(Clone, Debug)]
pub struct Invalidation {
    /// All invalidated unit ids, including removed units (which cannot be
    /// recompiled but still seed propagation and must be dropped from the
    /// merged analysis).
    pub invalidated: BTreeSet<UnitId>,
    /// Units present in the previous analysis but absent from the current
    /// source set.
    pub removed: BTreeSet<UnitId>,
    /// `true` when everything compiles: cold start or setup change.
    pub full_rebuild: bool,
    /// The phase the engine finished in. Always [`Phase::Fixed`] on return;
    /// carried for reporting.
    pub phase: Phase,
}

impl Invalidation {
    /// Returns `true` if nothing needs recompiling and nothing was removed.
    pub fn is_empty(&self) -> bool {
        self.invalidated.is_empty() && self.removed.is_empty()
    }
}

/// Computes the recompilation set via fixpoint expansion over the previous
/// cycle's dependency graph.
pub struct InvalidationEngine;

impl InvalidationEngine {
    /// Runs the `Initial`, `Direct`, and pre-compile `Transitive` phases.
    ///
    /// Inheritance edges propagate here unconditionally. Member-reference
    /// edges propagate here only from removed units, whose every defined
    /// name is known to have changed without compiling anything. Propagation
    /// from units that merely recompile is decided after the frontend ran,
    /// via [`expand`](Self::expand) with a fresh [`ApiDiff`].
    pub fn compute(
        previous: &PreviousResult,
        sources: &BTreeMap<UnitId, Stamp>,
        classpath: &BTreeMap<PathBuf, Stamp>,
        setup: SetupFingerprint,
    ) -> Invalidation {
        let (prev, prev_setup) = match previous {
            PreviousResult::NoPrevious => return Self::full(sources, BTreeSet::new()),
            PreviousResult::Previous { analysis, setup } => (analysis, *setup),
        };

        let removed: BTreeSet<UnitId> = prev
            .source_stamps
            .keys()
            .filter(|u| !sources.contains_key(*u))
            .cloned()
            .collect();

        // Direct phase, setup rule: any setup change forces a full rebuild.
        if setup != prev_setup {
            return Self::full(sources, removed);
        }

        // Initial: stamp-changed and added sources, plus removed ones. A
        // currently missing file always counts as changed, even when the
        // previous cycle already recorded it as missing.
        let mut invalidated: BTreeSet<UnitId> = sources
            .iter()
            .filter(|(unit, stamp)| {
                stamp.is_missing() || prev.source_stamps.get(*unit) != Some(*stamp)
            })
            .map(|(unit, _)| unit.clone())
            .collect();
        invalidated.extend(removed.iter().cloned());

        // Direct: units depending on a classpath entry whose stamp changed,
        // with the same rule for missing entries as for sources.
        let changed_entries: BTreeSet<&PathBuf> = prev
            .classpath_stamps
            .iter()
            .filter(|(path, stamp)| match classpath.get(*path) {
                Some(current) => current.is_missing() || current != *stamp,
                None => true,
            })
            .map(|(path, _)| path)
            .collect();
        if !changed_entries.is_empty() {
            for edge in &prev.edges {
                if let EdgeTarget::Classpath(entry) = &edge.to {
                    if changed_entries.contains(entry) {
                        invalidated.insert(edge.from.clone());
                    }
                }
            }
        }

        // Transitive: monotone fixpoint over the edge set.
        loop {
            let mut grew = false;
            for edge in &prev.edges {
                let EdgeTarget::Unit(to) = &edge.to else {
                    continue;
                };
                if !invalidated.contains(to) || invalidated.contains(&edge.from) {
                    continue;
                }
                let propagates = match edge.kind {
                    DependencyKind::Inheritance | DependencyKind::LocalInheritance => true,
                    // A removed target's every name hash is changed; a
                    // merely-recompiling target's hashes are unknown until
                    // the frontend ran.
                    DependencyKind::MemberReference => removed.contains(to),
                };
                if propagates {
                    invalidated.insert(edge.from.clone());
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }

        Invalidation {
            invalidated,
            removed,
            full_rebuild: false,
            phase: Phase::Fixed,
        }
    }

    /// Expands an already-computed set with member-reference propagation
    /// driven by a fresh API diff, then re-closes over inheritance edges.
    ///
    /// Returns only the newly added units; callers accumulate them into the
    /// cycle's set, keeping growth monotone.
    pub fn expand(
        prev: &Analysis,
        diff: &ApiDiff,
        already: &BTreeSet<UnitId>,
    ) -> BTreeSet<UnitId> {
        let mut additions = BTreeSet::new();

        for edge in &prev.edges {
            if edge.kind != DependencyKind::MemberReference {
                continue;
            }
            let EdgeTarget::Unit(to) = &edge.to else {
                continue;
            };
            if already.contains(&edge.from) || additions.contains(&edge.from) {
                continue;
            }
            let Some(changed) = diff.changed_names.get(to) else {
                continue;
            };
            let used = prev.used_names.get(&edge.from);
            if used.is_some_and(|names| !names.is_disjoint(changed)) {
                additions.insert(edge.from.clone());
            }
        }

        // Anything newly invalidated drags its inheritance dependents along.
        loop {
            let mut grew = false;
            for edge in &prev.edges {
                if !edge.kind.propagates_unconditionally() {
                    continue;
                }
                let EdgeTarget::Unit(to) = &edge.to else {
                    continue;
                };
                if additions.contains(to)
                    && !already.contains(&edge.from)
                    && !additions.contains(&edge.from)
                {
                    additions.insert(edge.from.clone());
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }

        additions
    }

    fn full(sources: &BTreeMap<UnitId, Stamp>, removed: BTreeSet<UnitId>) -> Invalidation {
        let mut invalidated: BTreeSet<UnitId> = sources.keys().cloned().collect();
        invalidated.extend(removed.iter().cloned());
        Invalidation {
            invalidated,
            removed,
            full_rebuild: true,
            phase: Phase::Fixed,
        }
    }
}
