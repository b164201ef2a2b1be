//! Dependency edge extraction from compiled output.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use kiln_analysis::{ClassName, DependencyEdge, DependencyKind, EdgeTarget, UnitId};
use kiln_diagnostics::{Diagnostic, DiagnosticSink};

use crate::output::{ClassFragment, CompiledUnit};

/// Resolves a referenced class name to the unit or classpath entry that
/// defines it.
///
/// Project classes take precedence over classpath classes of the same name,
/// matching the frontend's own resolution order.
pub struct ClassLookup<'a> {
    project: &'a BTreeMap<ClassName, UnitId>,
    classpath: &'a BTreeMap<ClassName, PathBuf>,
}

impl<'a> ClassLookup<'a> {
    /// Creates a lookup over the project's class index and the classpath's
    /// class index.
    pub fn new(
        project: &'a BTreeMap<ClassName, UnitId>,
        classpath: &'a BTreeMap<ClassName, PathBuf>,
    ) -> Self {
        Self { project, classpath }
    }

    /// Resolves a class name to an edge target.
    ///
    /// Returns `None` for names defined by neither the project nor a tracked
    /// classpath entry (platform classes, generated names); such references
    /// carry no invalidation information and produce no edge.
    pub fn resolve(&self, name: &str) -> Option<EdgeTarget> {
        if let Some(unit) = self.project.get(name) {
            return Some(EdgeTarget::Unit(unit.clone()));
        }
        self.classpath
            .get(name)
            .map(|entry| EdgeTarget::Classpath(entry.clone()))
    }
}

/// Turns one unit's compiled output into a set of typed dependency edges.
pub struct DependencyExtractor;

impl DependencyExtractor {
    /// Extracts all dependency edges for `output`.
    ///
    /// Classification: a direct supertype of a compiled class is
    /// [`DependencyKind::Inheritance`]; a supertype realized through a local
    /// or anonymous subclass is [`DependencyKind::LocalInheritance`]; every
    /// other referenced class is [`DependencyKind::MemberReference`].
    /// Self-edges are dropped. Malformed fragments are skipped with a
    /// warning diagnostic and extraction continues.
    pub fn extract(
        output: &CompiledUnit,
        lookup: &ClassLookup<'_>,
        sink: &DiagnosticSink,
    ) -> Vec<DependencyEdge> {
        let mut edges = BTreeSet::new();

        for fragment in &output.classes {
            let class = match fragment {
                ClassFragment::Parsed(c) => c,
                ClassFragment::Malformed { reason } => {
                    sink.emit(
                        Diagnostic::warning(format!(
                            "skipping malformed compiled fragment: {reason}"
                        ))
                        .with_unit(output.unit.path()),
                    );
                    continue;
                }
            };

            for name in &class.api.inherited {
                Self::record(&mut edges, output, lookup, name, DependencyKind::Inheritance);
            }
            for name in &class.local_inherited {
                Self::record(
                    &mut edges,
                    output,
                    lookup,
                    name,
                    DependencyKind::LocalInheritance,
                );
            }
            for name in &class.member_refs {
                Self::record(
                    &mut edges,
                    output,
                    lookup,
                    name,
                    DependencyKind::MemberReference,
                );
            }
        }

        edges.into_iter().collect()
    }

    fn record(
        edges: &mut BTreeSet<DependencyEdge>,
        output: &CompiledUnit,
        lookup: &ClassLookup<'_>,
        name: &str,
        kind: DependencyKind,
    ) {
        let Some(target) = lookup.resolve(name) else {
            return;
        };
        if matches!(&target, EdgeTarget::Unit(u) if *u == output.unit) {
            return;
        }
        edges.insert(DependencyEdge {
            from: output.unit.clone(),
            to: target,
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_analysis::ClassApi;
    use crate::output::CompiledClass;

    fn compiled_unit(
        unit: &str,
        class: &str,
        inherited: &[&str],
        local_inherited: &[&str],
        member_refs: &[&str],
    ) -> CompiledUnit {
        let mut api = ClassApi::new(class);
        api.inherited = inherited.iter().map(|s| s.to_string()).collect();
        CompiledUnit {
            unit: UnitId::from(unit),
            classes: vec![ClassFragment::Parsed(CompiledClass {
                api,
                local_inherited: local_inherited.iter().map(|s| s.to_string()).collect(),
                member_refs: member_refs.iter().map(|s| s.to_string()).collect(),
            })],
        }
    }

    fn project_index(entries: &[(&str, &str)]) -> BTreeMap<ClassName, UnitId> {
        entries
            .iter()
            .map(|(class, unit)| (class.to_string(), UnitId::from(*unit)))
            .collect()
    }

    #[test]
    fn classifies_inheritance() {
        let project = project_index(&[("A", "src/A.unit"), ("B", "src/B.unit")]);
        let classpath = BTreeMap::new();
        let lookup = ClassLookup::new(&project, &classpath);
        let sink = DiagnosticSink::new();

        let output = compiled_unit("src/A.unit", "A", &["B"], &[], &[]);
        let edges = DependencyExtractor::extract(&output, &lookup, &sink);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, DependencyKind::Inheritance);
        assert_eq!(edges[0].to, EdgeTarget::Unit(UnitId::from("src/B.unit")));
    }

    #[test]
    fn classifies_local_inheritance() {
        let project = project_index(&[("A", "src/A.unit"), ("B", "src/B.unit")]);
        let classpath = BTreeMap::new();
        let lookup = ClassLookup::new(&project, &classpath);
        let sink = DiagnosticSink::new();

        let output = compiled_unit("src/A.unit", "A", &[], &["B"], &[]);
        let edges = DependencyExtractor::extract(&output, &lookup, &sink);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, DependencyKind::LocalInheritance);
    }

    #[test]
    fn classifies_member_reference() {
        let project = project_index(&[("A", "src/A.unit"), ("B", "src/B.unit")]);
        let classpath = BTreeMap::new();
        let lookup = ClassLookup::new(&project, &classpath);
        let sink = DiagnosticSink::new();

        let output = compiled_unit("src/A.unit", "A", &[], &[], &["B"]);
        let edges = DependencyExtractor::extract(&output, &lookup, &sink);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, DependencyKind::MemberReference);
    }

    #[test]
    fn external_reference_targets_classpath_entry() {
        let project = project_index(&[("A", "src/A.unit")]);
        let classpath =
            BTreeMap::from([("Lib".to_string(), PathBuf::from("lib/core.jar"))]);
        let lookup = ClassLookup::new(&project, &classpath);
        let sink = DiagnosticSink::new();

        let output = compiled_unit("src/A.unit", "A", &[], &[], &["Lib"]);
        let edges = DependencyExtractor::extract(&output, &lookup, &sink);

        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges[0].to,
            EdgeTarget::Classpath(PathBuf::from("lib/core.jar"))
        );
    }

    #[test]
    fn project_class_shadows_classpath_class() {
        let project = project_index(&[("A", "src/A.unit"), ("B", "src/B.unit")]);
        let classpath = BTreeMap::from([("B".to_string(), PathBuf::from("lib/old.jar"))]);
        let lookup = ClassLookup::new(&project, &classpath);
        let sink = DiagnosticSink::new();

        let output = compiled_unit("src/A.unit", "A", &[], &[], &["B"]);
        let edges = DependencyExtractor::extract(&output, &lookup, &sink);

        assert_eq!(edges[0].to, EdgeTarget::Unit(UnitId::from("src/B.unit")));
    }

    #[test]
    fn self_edges_are_dropped() {
        let project = project_index(&[("A", "src/A.unit"), ("A2", "src/A.unit")]);
        let classpath = BTreeMap::new();
        let lookup = ClassLookup::new(&project, &classpath);
        let sink = DiagnosticSink::new();

        // A references its sibling class A2 defined in the same unit.
        let output = compiled_unit("src/A.unit", "A", &[], &[], &["A2"]);
        let edges = DependencyExtractor::extract(&output, &lookup, &sink);
        assert!(edges.is_empty());
    }

    #[test]
    fn unknown_references_produce_no_edges() {
        let project = project_index(&[("A", "src/A.unit")]);
        let classpath = BTreeMap::new();
        let lookup = ClassLookup::new(&project, &classpath);
        let sink = DiagnosticSink::new();

        let output = compiled_unit("src/A.unit", "A", &[], &[], &["platform.Object"]);
        let edges = DependencyExtractor::extract(&output, &lookup, &sink);
        assert!(edges.is_empty());
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn malformed_fragment_warns_and_continues() {
        let project = project_index(&[("A", "src/A.unit"), ("B", "src/B.unit")]);
        let classpath = BTreeMap::new();
        let lookup = ClassLookup::new(&project, &classpath);
        let sink = DiagnosticSink::new();

        let mut output = compiled_unit("src/A.unit", "A", &["B"], &[], &[]);
        output.classes.insert(
            0,
            ClassFragment::Malformed {
                reason: "truncated constant pool".to_string(),
            },
        );

        let edges = DependencyExtractor::extract(&output, &lookup, &sink);

        // The good fragment's edge is still extracted.
        assert_eq!(edges.len(), 1);
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("malformed"));
        assert!(!sink.has_errors());
    }

    #[test]
    fn duplicate_references_deduplicate() {
        let project = project_index(&[("A", "src/A.unit"), ("B", "src/B.unit")]);
        let classpath = BTreeMap::new();
        let lookup = ClassLookup::new(&project, &classpath);
        let sink = DiagnosticSink::new();

        let mut output = compiled_unit("src/A.unit", "A", &[], &[], &["B"]);
        // A second class in the same unit referencing B again.
        let mut api = ClassApi::new("AInner");
        api.inherited = Vec::new();
        output.classes.push(ClassFragment::Parsed(CompiledClass {
            api,
            local_inherited: Vec::new(),
            member_refs: BTreeSet::from(["B".to_string()]),
        }));

        let edges = DependencyExtractor::extract(&output, &lookup, &sink);
        assert_eq!(edges.len(), 1);
    }
}
