//! # profile-cache
//!
//! Per-principal user-profile event cache.
//!
//! [`ProfileCache`] stores one record per authenticated principal in a
//! pluggable [`StorageService`](profile_storage::StorageService) and
//! exposes single-event get/set operations over it. Each write is a
//! read-modify-write of the whole record, serialized per derived key so
//! concurrent writers for the same principal cannot lose updates, and
//! stamped with a fresh server-side expiration (default 180 days).
//!
//! [`ProfileHistory`] layers the typed flows on top: recording login
//! events, connected-organization counters, and issued-token snapshots,
//! and revoking tokens through a [`RevocationCache`].
//!
//! Storage failures are never surfaced to callers: reads degrade to "no
//! history yet", writes report `false`. Only configuration mistakes
//! (missing or client-side store, non-positive expiration) are hard
//! errors, raised at construction time.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod cache;
pub mod error;
pub mod history;
pub mod key;
pub mod revocation;

pub use cache::{ProfileCache, ProfileCacheBuilder};
pub use error::{CacheError, CacheResult};
pub use history::ProfileHistory;
pub use key::{derive_storage_key, HASHED_KEY_LEN};
pub use revocation::RevocationCache;
