//! The shape of one unit's compiled output as handed over by the frontend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use kiln_analysis::{ClassApi, ClassName, UnitId};

/// Everything the frontend reports about one compiled class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompiledClass {
    /// The class's structural API surface.
    pub api: ClassApi,
    /// Supertypes realized through local or anonymous subclasses inside
    /// this class, rather than by the class itself.
    pub local_inherited: Vec<ClassName>,
    /// Classes whose members this class references.
    pub member_refs: BTreeSet<ClassName>,
}

/// One fragment of a unit's compiled output.
///
/// A frontend may emit fragments it could not fully decode; those must not
/// abort extraction for the rest of the unit set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClassFragment {
    /// A fully decoded class.
    Parsed(CompiledClass),
    /// A fragment the frontend could not decode. Skipped with a warning.
    Malformed {
        /// Why the fragment could not be decoded.
        reason: String,
    },
}

/// The compiled output of one source unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompiledUnit {
    /// The unit this output belongs to.
    pub unit: UnitId,
    /// All class fragments the frontend produced for the unit.
    pub classes: Vec<ClassFragment>,
}

impl CompiledUnit {
    /// Returns the successfully decoded classes, skipping malformed fragments.
    pub fn parsed_classes(&self) -> impl Iterator<Item = &CompiledClass> {
        self.classes.iter().filter_map(|f| match f {
            ClassFragment::Parsed(c) => Some(c),
            ClassFragment::Malformed { .. } => None,
        })
    }

    /// Returns the names of all classes this unit produced.
    pub fn class_names(&self) -> Vec<ClassName> {
        self.parsed_classes().map(|c| c.api.name.clone()).collect()
    }
}
