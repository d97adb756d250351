//! Error types for the analytics engine.

use thiserror::Error;

use pulse_core::StoreError;

/// Errors that can occur while computing analytical views.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A caller-supplied argument was unusable (e.g. an empty search query).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Report serialization failed.
    #[error("export failed: {0}")]
    Export(String),
}
