//! # profile-events
//!
//! Data types for the user-profile event cache.
//!
//! The leaf types are [`Event`] (one named, timestamped, opaque string
//! value) and [`EventMap`] (all named events for one principal, stored as
//! a single record). On top of them sit the payload collections, each a
//! structured JSON document carried as the *string* value of one event:
//!
//! - [`LoginEvents`] - rotating login history, capped oldest-first
//! - [`ConnectedOrganizations`] - per-relying-party authentication counters
//! - [`AccessTokens`] / [`RefreshTokens`] - issued-token snapshots
//!
//! Collections never perform I/O; callers read an event through the
//! cache, [`parse`](LoginEvents::parse) the payload, mutate it, and write
//! the [`serialize`](LoginEvents::serialize)d result back.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod attribute;
pub mod connected_organizations;
pub mod error;
pub mod event;
pub mod login_events;
pub mod names;
pub mod tokens;

pub use attribute::AttributeSnapshot;
pub use connected_organizations::{ConnectedOrganization, ConnectedOrganizations};
pub use error::{EventsError, EventsResult};
pub use event::{Event, EventMap};
pub use login_events::{LoginEvent, LoginEvents};
pub use tokens::{AccessTokenEntry, AccessTokens, RefreshTokenEntry, RefreshTokens};
