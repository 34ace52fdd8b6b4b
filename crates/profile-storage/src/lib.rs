//! # profile-storage
//!
//! Storage abstraction for the user-profile event cache.
//!
//! This crate defines the [`StorageService`] contract consumed by the
//! profile cache: a pluggable, server-side key/value store with absolute
//! per-record expiration. Concrete backends (database, distributed cache)
//! implement this trait; an in-memory implementation is provided for
//! development and testing.
//!
//! ## Contract highlights
//!
//! - [`StorageService::update`] reports a missing record as `Ok(false)`
//!   rather than an error, so callers can fall back to `create`.
//! - [`StorageService::read`] never returns an expired record.
//! - [`StorageCapabilities`] describes per-backend limits; stores that
//!   only persist on the client (e.g. cookie-backed) advertise
//!   `server_side = false` and are rejected by the cache at configuration
//!   time.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod memory;
pub mod service;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStorageService;
pub use service::{StorageCapabilities, StorageRecord, StorageService};
