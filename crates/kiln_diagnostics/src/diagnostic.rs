//! Structured diagnostic messages with severity and an optional source unit.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A structured diagnostic message attributed to a source unit.
///
/// Diagnostics are the primary mechanism for reporting frontend compile
/// errors and engine-side warnings to the caller. Unlike a language
/// frontend's own diagnostics, these carry no source spans: the engine sees
/// units, not token positions. A frontend may put positional detail into the
/// message text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The main diagnostic message.
    pub message: String,
    /// The source unit the diagnostic refers to, if attributable to one.
    pub unit: Option<PathBuf>,
    /// Explanatory footnotes (e.g., "note: ...").
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            unit: None,
            notes: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic with the given message.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            unit: None,
            notes: Vec::new(),
        }
    }

    /// Creates a new note diagnostic with the given message.
    pub fn note(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            message: message.into(),
            unit: None,
            notes: Vec::new(),
        }
    }

    /// Attributes this diagnostic to a source unit.
    pub fn with_unit(mut self, unit: impl Into<PathBuf>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}
