//! Error types for the entity store.

use thiserror::Error;

/// Errors that can occur in the entity store and engagement maintainer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or missing input on a write request.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown id or dangling reference.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// A uniqueness or referential policy was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Derived counters no longer match the raw activity rows.
    ///
    /// This should never occur while all mutations go through the store's
    /// write path. If it does, the affected aggregate cannot be trusted and
    /// the divergence must be surfaced to operators, not repaired silently.
    #[error("consistency violation on post {post_id}: {detail}")]
    InternalConsistency { post_id: u64, detail: String },
}
