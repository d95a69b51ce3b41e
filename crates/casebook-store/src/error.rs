//! Error types for conversation store access.

/// Errors returned by conversation stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database driver reported a failure.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    /// A returned document did not match the record model.
    #[error("failed to decode record: {0}")]
    Decode(String),
    /// A backend-specific failure without a driver error.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
