//! In-memory storage service for development and testing.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::service::{StorageCapabilities, StorageRecord, StorageService};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expiration: DateTime<Utc>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration <= now
    }
}

/// In-memory [`StorageService`] implementation.
///
/// For production with multiple instances, use a shared backend; this
/// implementation keeps all records in process memory. Expiration is
/// honored lazily: expired entries are invisible to reads and treated as
/// absent by `update`/`delete`.
pub struct InMemoryStorageService {
    capabilities: StorageCapabilities,
    records: RwLock<HashMap<(String, String), Entry>>,
}

impl InMemoryStorageService {
    /// Creates a new in-memory storage service with default capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capabilities(StorageCapabilities::default())
    }

    /// Creates a new in-memory storage service with explicit capabilities.
    ///
    /// Tests use this to simulate backends with small key limits or
    /// client-side-only persistence.
    #[must_use]
    pub fn with_capabilities(capabilities: StorageCapabilities) -> Self {
        Self {
            capabilities,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the number of live records across all contexts.
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.records
            .read()
            .await
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    /// Checks whether the store holds no live records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_key(&self, key: &str) -> StorageResult<()> {
        if key.len() > self.capabilities.max_key_size {
            return Err(StorageError::key_too_long(
                key.len(),
                self.capabilities.max_key_size,
            ));
        }
        Ok(())
    }
}

impl Default for InMemoryStorageService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageService for InMemoryStorageService {
    fn capabilities(&self) -> StorageCapabilities {
        self.capabilities
    }

    async fn create(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expiration: DateTime<Utc>,
    ) -> StorageResult<bool> {
        self.check_key(key)?;

        let mut records = self.records.write().await;
        let slot = (context.to_string(), key.to_string());
        let now = Utc::now();

        if records.get(&slot).is_some_and(|e| !e.is_expired(now)) {
            return Ok(false);
        }

        records.insert(
            slot,
            Entry {
                value: value.to_string(),
                expiration,
            },
        );
        Ok(true)
    }

    async fn update(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expiration: DateTime<Utc>,
    ) -> StorageResult<bool> {
        self.check_key(key)?;

        let mut records = self.records.write().await;
        let slot = (context.to_string(), key.to_string());
        let now = Utc::now();

        match records.get_mut(&slot) {
            Some(entry) if !entry.is_expired(now) => {
                entry.value = value.to_string();
                entry.expiration = expiration;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn read(&self, context: &str, key: &str) -> StorageResult<Option<StorageRecord>> {
        self.check_key(key)?;

        let records = self.records.read().await;
        let slot = (context.to_string(), key.to_string());
        let now = Utc::now();

        Ok(records
            .get(&slot)
            .filter(|e| !e.is_expired(now))
            .map(|e| StorageRecord::new(e.value.clone(), Some(e.expiration))))
    }

    async fn delete(&self, context: &str, key: &str) -> StorageResult<bool> {
        self.check_key(key)?;

        let mut records = self.records.write().await;
        let slot = (context.to_string(), key.to_string());
        let now = Utc::now();

        match records.remove(&slot) {
            Some(entry) => Ok(!entry.is_expired(now)),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn far_future() -> DateTime<Utc> {
        Utc::now() + Duration::hours(1)
    }

    #[tokio::test]
    async fn create_then_read() {
        let store = InMemoryStorageService::new();

        assert!(store.create("ctx", "k", "v", far_future()).await.unwrap());
        let record = store.read("ctx", "k").await.unwrap().unwrap();
        assert_eq!(record.value, "v");
    }

    #[tokio::test]
    async fn create_refuses_live_duplicate() {
        let store = InMemoryStorageService::new();

        assert!(store.create("ctx", "k", "v1", far_future()).await.unwrap());
        assert!(!store.create("ctx", "k", "v2", far_future()).await.unwrap());

        let record = store.read("ctx", "k").await.unwrap().unwrap();
        assert_eq!(record.value, "v1");
    }

    #[tokio::test]
    async fn update_missing_record_returns_false() {
        let store = InMemoryStorageService::new();

        assert!(!store.update("ctx", "k", "v", far_future()).await.unwrap());
    }

    #[tokio::test]
    async fn update_replaces_value() {
        let store = InMemoryStorageService::new();

        store.create("ctx", "k", "v1", far_future()).await.unwrap();
        assert!(store.update("ctx", "k", "v2", far_future()).await.unwrap());

        let record = store.read("ctx", "k").await.unwrap().unwrap();
        assert_eq!(record.value, "v2");
    }

    #[tokio::test]
    async fn expired_record_is_invisible() {
        let store = InMemoryStorageService::new();
        let past = Utc::now() - Duration::seconds(1);

        store.create("ctx", "k", "v", past).await.unwrap();

        assert!(store.read("ctx", "k").await.unwrap().is_none());
        assert!(!store.update("ctx", "k", "v2", far_future()).await.unwrap());
        // An expired record does not block re-creation.
        assert!(store.create("ctx", "k", "v3", far_future()).await.unwrap());
    }

    #[tokio::test]
    async fn contexts_are_isolated() {
        let store = InMemoryStorageService::new();

        store.create("a", "k", "va", far_future()).await.unwrap();
        store.create("b", "k", "vb", far_future()).await.unwrap();

        assert_eq!(store.read("a", "k").await.unwrap().unwrap().value, "va");
        assert_eq!(store.read("b", "k").await.unwrap().unwrap().value, "vb");
    }

    #[tokio::test]
    async fn oversized_key_is_rejected() {
        let store = InMemoryStorageService::with_capabilities(StorageCapabilities {
            max_key_size: 8,
            server_side: true,
        });

        let err = store
            .create("ctx", "way-too-long-key", "v", far_future())
            .await
            .unwrap_err();
        assert!(err.is_limit_exceeded());
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemoryStorageService::new();

        store.create("ctx", "k", "v", far_future()).await.unwrap();
        assert!(store.delete("ctx", "k").await.unwrap());
        assert!(!store.delete("ctx", "k").await.unwrap());
        assert!(store.read("ctx", "k").await.unwrap().is_none());
    }
}
