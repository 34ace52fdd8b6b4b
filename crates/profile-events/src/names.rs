//! Well-known event names used by the payload collections.
//!
//! Names are part of the stored record format and must not change for
//! deployments with existing records.

/// Event holding the login history collection.
pub const LOGIN_EVENTS: &str = "LoginEvents";

/// Event holding the connected-organization counters.
pub const CONNECTED_ORGANIZATIONS: &str = "CONNECTED_ORGANIZATIONS";

/// Event holding the access-token snapshots.
pub const ACCESS_TOKENS: &str = "ACCESS_TOKENS";

/// Event holding the refresh-token snapshots.
pub const REFRESH_TOKENS: &str = "REFRESH_TOKENS";
