//! The per-principal event cache engine.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{Duration, Utc};
use profile_events::{Event, EventMap};
use profile_storage::StorageService;
use tokio::sync::Mutex;

use crate::error::{CacheError, CacheResult};
use crate::key::{derive_storage_key, HASHED_KEY_LEN};

/// Default record lifetime, measured from the last write.
pub const DEFAULT_RECORD_EXPIRATION_DAYS: i64 = 180;

/// Default storage context partitioning profile records from unrelated
/// data in a shared backend.
pub const DEFAULT_CONTEXT: &str = "user-profile-cache";

/// Number of lock shards serializing same-key writes.
const LOCK_SHARDS: usize = 64;

/// Builder for [`ProfileCache`].
pub struct ProfileCacheBuilder {
    storage: Option<Arc<dyn StorageService>>,
    record_expiration: Duration,
    context: String,
}

impl ProfileCacheBuilder {
    /// Creates a builder with the default expiration and context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: None,
            record_expiration: Duration::days(DEFAULT_RECORD_EXPIRATION_DAYS),
            context: DEFAULT_CONTEXT.to_string(),
        }
    }

    /// Sets the backing storage service. Required.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn StorageService>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets the record expiration, measured from the last write.
    #[must_use]
    pub fn record_expiration(mut self, expiration: Duration) -> Self {
        self.record_expiration = expiration;
        self
    }

    /// Sets the storage context string.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Builds the cache, validating the configuration.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if no storage service was supplied,
    /// the storage service is client-side-only, its key limit cannot hold
    /// a hashed fallback key, or the record expiration is not positive.
    pub fn build(self) -> CacheResult<ProfileCache> {
        let storage = self.storage.ok_or_else(|| {
            CacheError::Configuration("no storage service configured".to_string())
        })?;

        if !storage.capabilities().server_side {
            return Err(CacheError::Configuration(
                "storage service must be server-side; client-side stores are not private or durable"
                    .to_string(),
            ));
        }

        // Long principal names fall back to a hashed key; a store that
        // cannot hold the hash would reject those principals on every
        // operation, so refuse it up front.
        let max_key_size = storage.capabilities().max_key_size;
        if max_key_size < HASHED_KEY_LEN {
            return Err(CacheError::Configuration(format!(
                "storage max key size {max_key_size} cannot hold a \
                 {HASHED_KEY_LEN}-character hashed key"
            )));
        }

        if self.record_expiration <= Duration::zero() {
            return Err(CacheError::Configuration(format!(
                "record expiration must be positive, got {}s",
                self.record_expiration.num_seconds()
            )));
        }

        Ok(ProfileCache {
            storage,
            record_expiration: self.record_expiration,
            context: self.context,
            locks: std::iter::repeat_with(|| Mutex::new(())).take(LOCK_SHARDS).collect(),
        })
    }
}

impl Default for ProfileCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-principal event cache over a pluggable storage service.
///
/// One record exists per principal, holding that principal's whole
/// [`EventMap`]. Every write re-reads the record, applies the one-event
/// change, and writes the record back with a fresh expiration; the cycle
/// is serialized per derived key through a sharded lock table, so
/// concurrent single-event writes for the same principal all land.
/// Writes for different principals proceed concurrently unless their
/// keys fall on the same shard.
///
/// Storage failures never escape: a failed read behaves as "no record",
/// a failed write returns `false`. Both are logged.
pub struct ProfileCache {
    storage: Arc<dyn StorageService>,
    record_expiration: Duration,
    context: String,
    locks: Vec<Mutex<()>>,
}

impl std::fmt::Debug for ProfileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileCache")
            .field("context", &self.context)
            .field("record_expiration", &self.record_expiration)
            .finish_non_exhaustive()
    }
}

impl ProfileCache {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> ProfileCacheBuilder {
        ProfileCacheBuilder::new()
    }

    /// Returns the storage context string.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Returns the configured record expiration.
    #[must_use]
    pub const fn record_expiration(&self) -> Duration {
        self.record_expiration
    }

    /// Returns the named event for a principal.
    ///
    /// An absent record, an expired record, a storage failure, and a
    /// corrupt record all yield `None`; failures are logged, never
    /// propagated.
    pub async fn get_single_event(&self, principal: &str, event_name: &str) -> Option<Event> {
        let key = self.derive_key(principal);
        self.read_event_map(&key).await.remove(event_name)
    }

    /// Inserts or replaces the named event for a principal, stamping it
    /// with the current time and refreshing the record's expiration.
    ///
    /// Returns `false` if the record could not be written; the failure is
    /// logged and the event is simply not recorded.
    pub async fn set_single_event(&self, principal: &str, event_name: &str, value: &str) -> bool {
        let key = self.derive_key(principal);

        // Serialize the read-modify-write cycle for this key; without it
        // two writers would both read the old map and the second write
        // would clobber the first.
        let _guard = self.shard(&key).lock().await;

        let mut map = self.read_event_map(&key).await;
        map.insert(event_name, Event::new(value));

        let json = match map.serialize() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(event = event_name, "failed to encode event map: {e}");
                return false;
            }
        };

        let expiration = Utc::now() + self.record_expiration;

        match self.storage.update(&self.context, &key, &json, expiration).await {
            Ok(true) => true,
            Ok(false) => {
                // No record yet for this principal.
                match self.storage.create(&self.context, &key, &json, expiration).await {
                    Ok(true) => true,
                    Ok(false) => {
                        tracing::warn!(event = event_name, "record appeared during upsert");
                        false
                    }
                    Err(e) => {
                        tracing::warn!(event = event_name, "failed to create profile record: {e}");
                        false
                    }
                }
            }
            Err(e) => {
                tracing::warn!(event = event_name, "failed to update profile record: {e}");
                false
            }
        }
    }

    fn derive_key(&self, principal: &str) -> String {
        derive_storage_key(principal, self.storage.capabilities().max_key_size)
    }

    /// Reads and decodes the principal's record, degrading every failure
    /// mode to an empty map.
    async fn read_event_map(&self, key: &str) -> EventMap {
        match self.storage.read(&self.context, key).await {
            Ok(Some(record)) => match EventMap::parse(&record.value) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!("corrupt profile record, treating as empty: {e}");
                    EventMap::new()
                }
            },
            Ok(None) => EventMap::new(),
            Err(e) => {
                tracing::warn!("failed to read profile record, treating as empty: {e}");
                EventMap::new()
            }
        }
    }

    fn shard(&self, key: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let idx = (hasher.finish() as usize) % self.locks.len();
        &self.locks[idx]
    }
}

#[cfg(test)]
mod tests {
    use profile_storage::{InMemoryStorageService, StorageCapabilities};

    use super::*;

    fn cache_over(storage: Arc<InMemoryStorageService>) -> ProfileCache {
        ProfileCache::builder().storage(storage).build().unwrap()
    }

    #[test]
    fn build_requires_storage() {
        let err = ProfileCache::builder().build().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn build_rejects_client_side_storage() {
        let storage = Arc::new(InMemoryStorageService::with_capabilities(
            StorageCapabilities {
                max_key_size: 255,
                server_side: false,
            },
        ));

        let err = ProfileCache::builder().storage(storage).build().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn build_rejects_store_with_key_limit_below_hashed_key() {
        let storage = Arc::new(InMemoryStorageService::with_capabilities(
            StorageCapabilities {
                max_key_size: 16,
                server_side: true,
            },
        ));

        let err = ProfileCache::builder().storage(storage).build().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("16"));
    }

    #[test]
    fn debug_output_omits_storage_internals() {
        let cache = cache_over(Arc::new(InMemoryStorageService::new()));
        let rendered = format!("{cache:?}");

        assert!(rendered.contains("ProfileCache"));
        assert!(rendered.contains(DEFAULT_CONTEXT));
    }

    #[test]
    fn build_rejects_non_positive_expiration() {
        let storage = Arc::new(InMemoryStorageService::new());

        let err = ProfileCache::builder()
            .storage(storage)
            .record_expiration(Duration::zero())
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn get_on_empty_store_is_none() {
        let cache = cache_over(Arc::new(InMemoryStorageService::new()));
        assert!(cache.get_single_event("jdoe", "EVENT").await.is_none());
    }

    #[tokio::test]
    async fn set_then_get() {
        let cache = cache_over(Arc::new(InMemoryStorageService::new()));

        assert!(cache.set_single_event("jdoe", "EVENT", "payload").await);

        let event = cache.get_single_event("jdoe", "EVENT").await.unwrap();
        assert_eq!(event.value(), "payload");
    }

    #[tokio::test]
    async fn sequential_writes_are_last_write_wins() {
        let cache = cache_over(Arc::new(InMemoryStorageService::new()));

        assert!(cache.set_single_event("jdoe", "k", "first").await);
        assert!(cache.set_single_event("jdoe", "k", "second").await);

        let event = cache.get_single_event("jdoe", "k").await.unwrap();
        assert_eq!(event.value(), "second");
    }

    #[tokio::test]
    async fn principals_are_isolated() {
        let cache = cache_over(Arc::new(InMemoryStorageService::new()));

        cache.set_single_event("alice", "EVENT", "for-alice").await;

        assert!(cache.get_single_event("bob", "EVENT").await.is_none());
    }

    #[tokio::test]
    async fn setting_one_event_preserves_others() {
        let cache = cache_over(Arc::new(InMemoryStorageService::new()));

        cache.set_single_event("jdoe", "a", "va").await;
        cache.set_single_event("jdoe", "b", "vb").await;

        assert_eq!(cache.get_single_event("jdoe", "a").await.unwrap().value(), "va");
        assert_eq!(cache.get_single_event("jdoe", "b").await.unwrap().value(), "vb");
    }

    #[tokio::test]
    async fn long_principal_names_are_hashed_and_isolated() {
        // The tightest limit the builder accepts: exactly one hashed key.
        let storage = Arc::new(InMemoryStorageService::with_capabilities(
            StorageCapabilities {
                max_key_size: HASHED_KEY_LEN,
                server_side: true,
            },
        ));
        let cache = cache_over(storage.clone());

        let long_a = "a-very-long-principal-name@subdomain.example.org";
        let long_b = "b-very-long-principal-name@subdomain.example.org";
        assert!(long_a.len() > HASHED_KEY_LEN);

        assert!(cache.set_single_event(long_a, "EVENT", "for-a").await);
        assert!(cache.set_single_event(long_b, "EVENT", "for-b").await);

        assert_eq!(cache.get_single_event(long_a, "EVENT").await.unwrap().value(), "for-a");
        assert_eq!(cache.get_single_event(long_b, "EVENT").await.unwrap().value(), "for-b");

        // The record really is stored under the hashed key, and the
        // store accepted it despite the principal name being over limit.
        let hashed = derive_storage_key(long_a, HASHED_KEY_LEN);
        assert_eq!(hashed.len(), HASHED_KEY_LEN);
        assert!(storage
            .read(DEFAULT_CONTEXT, &hashed)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn corrupt_record_reads_as_empty() {
        let storage = Arc::new(InMemoryStorageService::new());
        storage
            .create(DEFAULT_CONTEXT, "jdoe", "not json", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let cache = cache_over(storage);
        assert!(cache.get_single_event("jdoe", "EVENT").await.is_none());
    }

    #[tokio::test]
    async fn write_replaces_corrupt_record() {
        let storage = Arc::new(InMemoryStorageService::new());
        storage
            .create(DEFAULT_CONTEXT, "jdoe", "not json", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let cache = cache_over(storage);
        assert!(cache.set_single_event("jdoe", "EVENT", "payload").await);
        assert_eq!(
            cache.get_single_event("jdoe", "EVENT").await.unwrap().value(),
            "payload"
        );
    }

    #[tokio::test]
    async fn storage_failures_read_as_empty_and_write_false() {
        use async_trait::async_trait;
        use chrono::DateTime;
        use profile_storage::{StorageError, StorageRecord, StorageResult};

        /// Storage double whose every operation fails.
        struct BrokenStorage;

        #[async_trait]
        impl StorageService for BrokenStorage {
            fn capabilities(&self) -> StorageCapabilities {
                StorageCapabilities::default()
            }

            async fn create(
                &self,
                _context: &str,
                _key: &str,
                _value: &str,
                _expiration: DateTime<Utc>,
            ) -> StorageResult<bool> {
                Err(StorageError::Connection("backend down".to_string()))
            }

            async fn update(
                &self,
                _context: &str,
                _key: &str,
                _value: &str,
                _expiration: DateTime<Utc>,
            ) -> StorageResult<bool> {
                Err(StorageError::Connection("backend down".to_string()))
            }

            async fn read(
                &self,
                _context: &str,
                _key: &str,
            ) -> StorageResult<Option<StorageRecord>> {
                Err(StorageError::Connection("backend down".to_string()))
            }

            async fn delete(&self, _context: &str, _key: &str) -> StorageResult<bool> {
                Err(StorageError::Connection("backend down".to_string()))
            }
        }

        let cache = ProfileCache::builder()
            .storage(Arc::new(BrokenStorage))
            .build()
            .unwrap();

        assert!(cache.get_single_event("jdoe", "EVENT").await.is_none());
        assert!(!cache.set_single_event("jdoe", "EVENT", "payload").await);
    }
}
