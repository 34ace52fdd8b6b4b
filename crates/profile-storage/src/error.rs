//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection to the storage backend failed.
    #[error("storage connection error: {0}")]
    Connection(String),

    /// A read or write against the backend failed.
    #[error("storage operation failed: {0}")]
    Operation(String),

    /// A key or value exceeded a backend limit.
    #[error("storage limit exceeded: {field} is {actual} bytes, limit {limit}")]
    LimitExceeded {
        /// Which field hit the limit ("key" or "value").
        field: &'static str,
        /// Actual size in bytes.
        actual: usize,
        /// Backend limit in bytes.
        limit: usize,
    },

    /// Invalid storage configuration.
    #[error("storage configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Creates a limit-exceeded error for an oversized key.
    #[must_use]
    pub const fn key_too_long(actual: usize, limit: usize) -> Self {
        Self::LimitExceeded {
            field: "key",
            actual,
            limit,
        }
    }

    /// Checks if this is a limit error.
    #[must_use]
    pub const fn is_limit_exceeded(&self) -> bool {
        matches!(self, Self::LimitExceeded { .. })
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
