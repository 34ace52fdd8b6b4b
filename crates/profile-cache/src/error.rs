//! Cache error types.

use thiserror::Error;

/// Errors surfaced by the profile cache.
///
/// Storage I/O failures are deliberately absent: the cache swallows and
/// logs them, degrading reads to "no history" and writes to `false`.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Invalid cache configuration, raised at construction time.
    #[error("cache configuration error: {0}")]
    Configuration(String),

    /// A revocation backend call failed.
    #[error("revocation error: {0}")]
    Revocation(String),
}

impl CacheError {
    /// Checks if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
