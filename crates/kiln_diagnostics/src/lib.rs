//! Diagnostic reporting for the Kiln build engine.
//!
//! Diagnostics carry compiler output (errors, warnings) and engine-side
//! warnings (extraction problems, store corruption) from any pipeline stage
//! to the caller. The sink is thread-safe so a parallelizing frontend can
//! emit into it directly.

#![warn(missing_docs)]

pub mod diagnostic;
pub mod severity;
pub mod sink;

pub use diagnostic::Diagnostic;
pub use severity::Severity;
pub use sink::DiagnosticSink;
