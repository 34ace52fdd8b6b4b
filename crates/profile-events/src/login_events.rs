//! Rotating login-history collection.

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeSnapshot;
use crate::error::{EventsError, EventsResult};

const PAYLOAD: &str = "login events";

/// One recorded login at a relying party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginEvent {
    /// Entity ID of the relying party.
    pub relying_party_id: String,

    /// Display name of the service, falling back to the entity ID when
    /// no friendly name was resolvable.
    pub service_name: String,

    /// Seconds since the Unix epoch when the login happened.
    pub time: u64,

    /// Attributes released during this login.
    #[serde(default)]
    pub attributes: Vec<AttributeSnapshot>,
}

impl LoginEvent {
    /// Creates a login event without attribute snapshots.
    #[must_use]
    pub fn new(
        relying_party_id: impl Into<String>,
        service_name: impl Into<String>,
        time: u64,
    ) -> Self {
        Self {
            relying_party_id: relying_party_id.into(),
            service_name: service_name.into(),
            time,
            attributes: Vec::new(),
        }
    }

    /// Sets the released-attribute snapshots.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<AttributeSnapshot>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Ordered login history for one principal, oldest first.
///
/// The entry cap is applied lazily: [`append`](Self::append) never drops
/// entries, [`serialize`](Self::serialize) truncates to `max_entries`
/// (removing the oldest first) before encoding. Observing an over-cap
/// collection between the two is expected, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginEvents {
    entries: Vec<LoginEvent>,
    max_entries: Option<usize>,
}

impl LoginEvents {
    /// Creates an empty, uncapped collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a collection from its stored JSON form (a plain array).
    ///
    /// The cap is not part of the wire format; apply it with
    /// [`with_max_entries`](Self::with_max_entries) after parsing.
    ///
    /// ## Errors
    ///
    /// Returns a decode error if the text is not a valid login-event array.
    pub fn parse(text: &str) -> EventsResult<Self> {
        let entries: Vec<LoginEvent> =
            serde_json::from_str(text).map_err(|e| EventsError::decode(PAYLOAD, e))?;
        Ok(Self {
            entries,
            max_entries: None,
        })
    }

    /// Sets the maximum number of entries kept at serialization time.
    ///
    /// The cap is per caller, not part of the stored record; a cap of
    /// zero keeps nothing.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Encodes the collection, first truncating to the cap oldest-first.
    ///
    /// ## Errors
    ///
    /// Returns an encode error if serialization fails.
    pub fn serialize(&mut self) -> EventsResult<String> {
        if let Some(max) = self.max_entries {
            while self.entries.len() > max {
                self.entries.remove(0);
            }
        }
        serde_json::to_string(&self.entries).map_err(|e| EventsError::encode(PAYLOAD, e))
    }

    /// Appends a login event. Never evicts; eviction happens at
    /// serialization time.
    pub fn append(&mut self, event: LoginEvent) {
        self.entries.push(event);
    }

    /// Returns the recorded events, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[LoginEvent] {
        &self.entries
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether no events are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
