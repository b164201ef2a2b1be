//! Per-identifier structural hashing of a unit's API surface.

use std::collections::{BTreeMap, BTreeSet};

use kiln_analysis::ClassApi;
use kiln_common::ContentHash;

/// Computes a structural hash per defined name of a unit's API, plus the
/// unit's used-name set.
///
/// This is the mechanism behind selective member-reference invalidation: a
/// dependent is only invalidated when a specific name it used has a changed
/// hash on the target, not merely because the target recompiled.
///
/// The approximation is deliberately coarse: all members sharing a name
/// hash together, and names collide across the unit's classes. An
/// identifier reused across unrelated members can therefore over-invalidate,
/// never under-invalidate.
pub struct NameHasher;

impl NameHasher {
    /// Computes the defined-name hash map for one unit's classes.
    ///
    /// Each member name maps to a hash over the sorted descriptors of every
    /// member carrying that name anywhere in the unit. Each class name maps
    /// to a hash over the class's inherited types and full member list, so
    /// a change to a class's shape shows up on the class's own name.
    pub fn hash_unit<'a>(
        classes: impl IntoIterator<Item = &'a ClassApi>,
    ) -> BTreeMap<String, ContentHash> {
        let mut member_sigs: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut class_shapes: BTreeMap<String, Vec<u8>> = BTreeMap::new();

        for class in classes {
            let mut shape = Vec::new();
            for sup in &class.inherited {
                shape.extend_from_slice(sup.as_bytes());
                shape.push(0);
            }
            shape.push(0);
            for member in &class.members {
                member_sigs
                    .entry(member.name.clone())
                    .or_default()
                    .insert(member.descriptor.clone());
                shape.extend_from_slice(member.name.as_bytes());
                shape.push(b':');
                shape.extend_from_slice(member.descriptor.as_bytes());
                shape.push(0);
            }
            class_shapes.insert(class.name.clone(), shape);
        }

        let mut hashes = BTreeMap::new();
        for (name, descriptors) in member_sigs {
            let mut buf = Vec::new();
            for d in descriptors {
                buf.extend_from_slice(d.as_bytes());
                buf.push(0);
            }
            hashes.insert(name, ContentHash::from_bytes(&buf));
        }
        // Class names override colliding member names: the class shape
        // subsumes its members' signatures.
        for (name, shape) in class_shapes {
            hashes.insert(name, ContentHash::from_bytes(&shape));
        }
        hashes
    }

    /// Collects the union of all identifiers the unit's classes reference.
    pub fn used_names<'a>(
        classes: impl IntoIterator<Item = &'a ClassApi>,
    ) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for class in classes {
            names.extend(class.used_names.iter().cloned());
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_analysis::MemberSignature;

    fn class(name: &str, members: &[(&str, &str)], inherited: &[&str]) -> ClassApi {
        let mut api = ClassApi::new(name);
        api.members = members
            .iter()
            .map(|(n, d)| MemberSignature {
                name: n.to_string(),
                descriptor: d.to_string(),
            })
            .collect();
        api.inherited = inherited.iter().map(|s| s.to_string()).collect();
        api
    }

    #[test]
    fn body_only_change_keeps_hashes() {
        // Same members, same signatures: the hash map must be identical
        // regardless of anything not captured in the API surface.
        let before = class("B", &[("render", "(int)->void")], &[]);
        let after = class("B", &[("render", "(int)->void")], &[]);
        assert_eq!(
            NameHasher::hash_unit([&before]),
            NameHasher::hash_unit([&after])
        );
    }

    #[test]
    fn signature_change_changes_name_hash() {
        let before = class("B", &[("render", "(int)->void")], &[]);
        let after = class("B", &[("render", "(long)->void")], &[]);

        let h_before = NameHasher::hash_unit([&before]);
        let h_after = NameHasher::hash_unit([&after]);
        assert_ne!(h_before.get("render"), h_after.get("render"));
    }

    #[test]
    fn unrelated_name_keeps_hash() {
        let before = class("B", &[("render", "(int)->void"), ("size", "()->int")], &[]);
        let after = class("B", &[("render", "(long)->void"), ("size", "()->int")], &[]);

        let h_before = NameHasher::hash_unit([&before]);
        let h_after = NameHasher::hash_unit([&after]);
        assert_eq!(h_before.get("size"), h_after.get("size"));
        assert_ne!(h_before.get("render"), h_after.get("render"));
    }

    #[test]
    fn overloads_share_one_hash() {
        // Conservative by design: both overloads hash under one name, so
        // changing either invalidates users of the name.
        let before = class(
            "B",
            &[("render", "(int)->void"), ("render", "(str)->void")],
            &[],
        );
        let after = class(
            "B",
            &[("render", "(int)->void"), ("render", "(bytes)->void")],
            &[],
        );
        let h_before = NameHasher::hash_unit([&before]);
        let h_after = NameHasher::hash_unit([&after]);
        assert_ne!(h_before.get("render"), h_after.get("render"));
    }

    #[test]
    fn inherited_change_changes_class_name_hash() {
        let before = class("B", &[], &["Base"]);
        let after = class("B", &[], &["OtherBase"]);
        let h_before = NameHasher::hash_unit([&before]);
        let h_after = NameHasher::hash_unit([&after]);
        assert_ne!(h_before.get("B"), h_after.get("B"));
    }

    #[test]
    fn used_names_union_across_classes() {
        let mut a = class("A", &[], &[]);
        a.used_names.insert("render".to_string());
        let mut b = class("AInner", &[], &[]);
        b.used_names.insert("size".to_string());
        b.used_names.insert("render".to_string());

        let names = NameHasher::used_names([&a, &b]);
        assert_eq!(names.len(), 2);
        assert!(names.contains("render"));
        assert!(names.contains("size"));
    }

    #[test]
    fn member_order_does_not_matter() {
        let fwd = class("B", &[("a", "()->int"), ("b", "()->int")], &[]);
        let rev_members = class("B", &[("b", "()->int"), ("a", "()->int")], &[]);
        // Per-member-name hashes are order independent.
        let h1 = NameHasher::hash_unit([&fwd]);
        let h2 = NameHasher::hash_unit([&rev_members]);
        assert_eq!(h1.get("a"), h2.get("a"));
        assert_eq!(h1.get("b"), h2.get("b"));
    }
}
