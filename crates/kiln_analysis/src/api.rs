//! Structural API surface of a compiled class.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A fully qualified class name as reported by the frontend.
pub type ClassName = String;

/// The signature of one class member: its name plus an opaque descriptor
/// string covering parameter types, return type, and modifiers.
///
/// The engine never interprets descriptors; it only hashes them. Two members
/// are API-equal exactly when their descriptor strings are byte-equal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSignature {
    /// The member's simple name.
    pub name: String,
    /// Opaque descriptor covering everything API-relevant about the member.
    pub descriptor: String,
}

/// Structural surface of one compiled class.
///
/// Produced per compiled unit and replaced wholesale each cycle the unit
/// recompiles. The `used_names` set feeds selective member-reference
/// invalidation: a dependent is only invalidated when a name it used has a
/// changed hash on the target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassApi {
    /// The class's fully qualified name.
    pub name: ClassName,
    /// Signatures of all declared members.
    pub members: Vec<MemberSignature>,
    /// Names of directly inherited classes and interfaces.
    pub inherited: Vec<ClassName>,
    /// Identifiers referenced anywhere in the class's API or body.
    pub used_names: BTreeSet<String>,
}

impl ClassApi {
    /// Creates an empty API surface for the given class name.
    pub fn new(name: impl Into<ClassName>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            inherited: Vec::new(),
            used_names: BTreeSet::new(),
        }
    }
}
