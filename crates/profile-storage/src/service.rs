//! Storage service trait and capability descriptor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageResult;

/// Default maximum key size advertised by backends that impose no limit
/// of their own.
pub const DEFAULT_MAX_KEY_SIZE: usize = 255;

/// Static capabilities of a storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageCapabilities {
    /// Maximum key length in bytes the backend accepts.
    pub max_key_size: usize,

    /// Whether records persist on the server rather than the client.
    ///
    /// Client-side stores (e.g. cookie-backed) lose records whenever the
    /// user switches browsers and expose them to the user; callers that
    /// need durable, private records must reject stores where this is
    /// `false`.
    pub server_side: bool,
}

impl Default for StorageCapabilities {
    fn default() -> Self {
        Self {
            max_key_size: DEFAULT_MAX_KEY_SIZE,
            server_side: true,
        }
    }
}

/// A record read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRecord {
    /// The stored value.
    pub value: String,

    /// When the record expires, if an expiration was set.
    pub expiration: Option<DateTime<Utc>>,
}

impl StorageRecord {
    /// Creates a record with the given value and expiration.
    #[must_use]
    pub const fn new(value: String, expiration: Option<DateTime<Utc>>) -> Self {
        Self { value, expiration }
    }
}

/// Pluggable key/value storage with per-record absolute expiration.
///
/// Keys are partitioned by a `context` string so unrelated subsystems can
/// share one backend without colliding. Implementations must be safe for
/// concurrent use from many tasks; they do not need to serialize
/// read-modify-write cycles (that is the caller's job).
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Returns the backend's static capabilities.
    fn capabilities(&self) -> StorageCapabilities;

    /// Creates a new record.
    ///
    /// Returns `Ok(false)` if a live record already exists for the key.
    ///
    /// ## Errors
    ///
    /// Returns an error if the backend rejects the operation.
    async fn create(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expiration: DateTime<Utc>,
    ) -> StorageResult<bool>;

    /// Replaces an existing record's value and expiration.
    ///
    /// Returns `Ok(false)` if no live record exists for the key, so the
    /// caller can fall back to [`create`](Self::create).
    ///
    /// ## Errors
    ///
    /// Returns an error if the backend rejects the operation.
    async fn update(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expiration: DateTime<Utc>,
    ) -> StorageResult<bool>;

    /// Reads a record.
    ///
    /// Returns `Ok(None)` if no record exists or the record has expired.
    ///
    /// ## Errors
    ///
    /// Returns an error if the backend rejects the operation.
    async fn read(&self, context: &str, key: &str) -> StorageResult<Option<StorageRecord>>;

    /// Deletes a record.
    ///
    /// Returns `Ok(false)` if no live record existed for the key.
    ///
    /// ## Errors
    ///
    /// Returns an error if the backend rejects the operation.
    async fn delete(&self, context: &str, key: &str) -> StorageResult<bool>;
}
