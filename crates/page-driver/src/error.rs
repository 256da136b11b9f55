//! Driver-level error taxonomy.

use thiserror::Error;

/// Failures surfaced by a [`crate::PageDriver`] implementation.
#[derive(Clone, Debug, Error)]
pub enum DriverError {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("no element matches selector \"{selector}\"")]
    ElementNotFound { selector: String },

    #[error("timed out waiting for \"{0}\"")]
    WaitTimeout(String),

    #[error("browser protocol error: {0}")]
    Protocol(String),

    #[error("session is closed")]
    SessionClosed,
}

impl DriverError {
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        DriverError::ElementNotFound {
            selector: selector.into(),
        }
    }
}
