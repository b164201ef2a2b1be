//! Error types for the driver.

use kiln_store::StoreError;

/// The frontend could not run at all.
///
/// Distinct from compile errors, which flow through the diagnostic sink and
/// count toward the error threshold: a `FrontendError` means no diagnostics
/// could be produced, for example because the bridge process failed to start.
#[derive(Debug, thiserror::Error)]
#[error("frontend invocation failed: {reason}")]
pub struct FrontendError {
    /// Description of the invocation failure.
    pub reason: String,
}

impl FrontendError {
    /// Creates a frontend invocation error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors that abort a build cycle outright.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The frontend could not be invoked.
    #[error(transparent)]
    Frontend(#[from] FrontendError),

    /// The finished analysis could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}
