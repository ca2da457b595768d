//! Storage error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("uniqueness conflict: {message}")]
    Conflict { message: String },

    /// A record that must exist was not found.
    #[error("record not found: {message}")]
    NotFound { message: String },

    /// The backend failed or an invariant it guarantees was broken.
    #[error("storage failure: {message}")]
    Internal { message: String },
}

impl StoreError {
    /// Creates a uniqueness conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates an internal storage error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true for uniqueness conflicts.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
