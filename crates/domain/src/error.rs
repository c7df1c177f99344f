//! Domain error types.

use thiserror::Error;

/// Errors produced by domain operations and the storage seams they call.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Storage error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}

impl DomainError {
    /// Wrap any storage-layer error.
    pub fn store(err: impl std::fmt::Display) -> Self {
        DomainError::Store(err.to_string())
    }
}
