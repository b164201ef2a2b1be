//! Per-unit API differences between two cycles.

use std::collections::{BTreeMap, BTreeSet};

use kiln_analysis::UnitId;
use kiln_common::ContentHash;

/// Names whose structural hash changed on each freshly recompiled unit.
///
/// Built by the driver after a frontend round by comparing the previous
/// analysis' name hashes against the fresh ones. A name counts as changed
/// when it was added, removed, or its hash differs.
#[derive(Clone, Debug, Default)]
pub struct ApiDiff {
    /// Changed names keyed by the unit that defines them.
    pub changed_names: BTreeMap<UnitId, BTreeSet<String>>,
}

impl ApiDiff {
    /// Creates an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no unit has any changed name.
    pub fn is_empty(&self) -> bool {
        self.changed_names.values().all(|names| names.is_empty())
    }

    /// Records the difference between a unit's old and new name-hash maps.
    ///
    /// `old` is `None` for a unit compiling for the first time; every fresh
    /// name then counts as changed.
    pub fn record(
        &mut self,
        unit: UnitId,
        old: Option<&BTreeMap<String, ContentHash>>,
        new: &BTreeMap<String, ContentHash>,
    ) {
        let changed = Self::diff_names(old, new);
        self.changed_names.insert(unit, changed);
    }

    /// Computes the set of changed names between two hash maps.
    pub fn diff_names(
        old: Option<&BTreeMap<String, ContentHash>>,
        new: &BTreeMap<String, ContentHash>,
    ) -> BTreeSet<String> {
        let Some(old) = old else {
            return new.keys().cloned().collect();
        };
        let mut changed = BTreeSet::new();
        for (name, hash) in new {
            if old.get(name) != Some(hash) {
                changed.insert(name.clone());
            }
        }
        for name in old.keys() {
            if !new.contains_key(name) {
                changed.insert(name.clone());
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashes(entries: &[(&str, &[u8])]) -> BTreeMap<String, ContentHash> {
        entries
            .iter()
            .map(|(name, data)| (name.to_string(), ContentHash::from_bytes(data)))
            .collect()
    }

    #[test]
    fn identical_maps_diff_empty() {
        let old = hashes(&[("render", b"sig1"), ("size", b"sig2")]);
        let new = old.clone();
        assert!(ApiDiff::diff_names(Some(&old), &new).is_empty());
    }

    #[test]
    fn changed_hash_is_detected() {
        let old = hashes(&[("render", b"sig1")]);
        let new = hashes(&[("render", b"sig2")]);
        let changed = ApiDiff::diff_names(Some(&old), &new);
        assert_eq!(changed, BTreeSet::from(["render".to_string()]));
    }

    #[test]
    fn added_and_removed_names_are_changed() {
        let old = hashes(&[("gone", b"sig1")]);
        let new = hashes(&[("fresh", b"sig2")]);
        let changed = ApiDiff::diff_names(Some(&old), &new);
        assert!(changed.contains("gone"));
        assert!(changed.contains("fresh"));
    }

    #[test]
    fn first_compile_counts_all_names() {
        let new = hashes(&[("a", b"1"), ("b", b"2")]);
        let changed = ApiDiff::diff_names(None, &new);
        assert_eq!(changed.len(), 2);
    }

    #[test]
    fn record_and_is_empty() {
        let mut diff = ApiDiff::new();
        assert!(diff.is_empty());

        let old = hashes(&[("render", b"sig1")]);
        diff.record(UnitId::from("src/B.unit"), Some(&old), &old.clone());
        assert!(diff.is_empty(), "no changed names means still empty");

        let new = hashes(&[("render", b"sig2")]);
        diff.record(UnitId::from("src/B.unit"), Some(&old), &new);
        assert!(!diff.is_empty());
    }
}
