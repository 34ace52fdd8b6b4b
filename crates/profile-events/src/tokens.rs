//! Issued-token snapshot collections.
//!
//! Snapshots record enough of an issued token to display it and to
//! revoke it; they never hold the sealed token itself. Expired entries
//! are kept in storage and pruned by the reader, never by the cache.

use serde::{Deserialize, Serialize};

use crate::error::{EventsError, EventsResult};

/// Snapshot of one issued access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenEntry {
    /// Unique identifier of this token.
    pub token_id: String,

    /// Identifier of the root (authorization grant) token this token was
    /// derived from; revoking the root invalidates the chain.
    pub token_root_id: String,

    /// OAuth client the token was issued to.
    pub client_id: String,

    /// Audience the token is valid for.
    #[serde(default)]
    pub audience: Vec<String>,

    /// Granted scope.
    #[serde(default)]
    pub scope: Vec<String>,

    /// Expiration, seconds since the Unix epoch.
    pub exp: u64,
}

impl AccessTokenEntry {
    /// Checks whether the token had expired at `now` (seconds since the
    /// Unix epoch).
    #[must_use]
    pub const fn is_expired(&self, now: u64) -> bool {
        self.exp <= now
    }
}

/// Snapshot of one issued refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenEntry {
    /// Unique identifier of this token.
    pub token_id: String,

    /// Identifier of the root (authorization grant) token.
    pub token_root_id: String,

    /// OAuth client the token was issued to.
    pub client_id: String,

    /// Granted scope.
    #[serde(default)]
    pub scope: Vec<String>,

    /// Expiration, seconds since the Unix epoch.
    pub exp: u64,
}

impl RefreshTokenEntry {
    /// Checks whether the token had expired at `now` (seconds since the
    /// Unix epoch).
    #[must_use]
    pub const fn is_expired(&self, now: u64) -> bool {
        self.exp <= now
    }
}

macro_rules! token_collection {
    ($(#[$doc:meta])* $name:ident, $entry:ty, $payload:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            entries: Vec<$entry>,
        }

        impl $name {
            /// Creates an empty collection.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Decodes a collection from its stored JSON form (a plain
            /// array).
            ///
            /// ## Errors
            ///
            /// Returns a decode error if the text is not a valid token
            /// array.
            pub fn parse(text: &str) -> EventsResult<Self> {
                let entries: Vec<$entry> = serde_json::from_str(text)
                    .map_err(|e| EventsError::decode($payload, e))?;
                Ok(Self { entries })
            }

            /// Encodes the collection to its stored JSON form.
            ///
            /// ## Errors
            ///
            /// Returns an encode error if serialization fails.
            pub fn serialize(&self) -> EventsResult<String> {
                serde_json::to_string(&self.entries)
                    .map_err(|e| EventsError::encode($payload, e))
            }

            /// Appends a token snapshot, oldest first.
            pub fn append(&mut self, entry: $entry) {
                self.entries.push(entry);
            }

            /// Drops entries whose expiration has passed at `now`
            /// (seconds since the Unix epoch), returning how many were
            /// removed.
            ///
            /// Pruning is the reader's responsibility; stored records
            /// keep expired entries until a caller rewrites the
            /// collection.
            pub fn prune_expired(&mut self, now: u64) -> usize {
                let before = self.entries.len();
                self.entries.retain(|e| !e.is_expired(now));
                before - self.entries.len()
            }

            /// Removes the snapshot with the given token ID, returning it
            /// if present.
            pub fn remove(&mut self, token_id: &str) -> Option<$entry> {
                let idx = self.entries.iter().position(|e| e.token_id == token_id)?;
                Some(self.entries.remove(idx))
            }

            /// Returns the snapshot with the given token ID, if present.
            #[must_use]
            pub fn get(&self, token_id: &str) -> Option<&$entry> {
                self.entries.iter().find(|e| e.token_id == token_id)
            }

            /// Returns the snapshots, oldest first.
            #[must_use]
            pub fn entries(&self) -> &[$entry] {
                &self.entries
            }

            /// Returns the number of snapshots.
            #[must_use]
            pub fn len(&self) -> usize {
                self.entries.len()
            }

            /// Checks whether no snapshots are recorded.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.entries.is_empty()
            }
        }
    };
}

token_collection!(
    /// Ordered access-token snapshots for one principal.
    AccessTokens,
    AccessTokenEntry,
    "access tokens"
);

token_collection!(
    /// Ordered refresh-token snapshots for one principal.
    RefreshTokens,
    RefreshTokenEntry,
    "refresh tokens"
);
