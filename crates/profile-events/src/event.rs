//! Named, timestamped events and the per-principal event map.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{EventsError, EventsResult};

/// One named event: an opaque string value plus the time it was recorded.
///
/// Events are immutable after construction. The value is opaque to the
/// cache; payload collections store their JSON encoding here, which keeps
/// the stored record format stable regardless of payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The opaque event value.
    value: String,

    /// Seconds since the Unix epoch when the event was recorded.
    time: u64,
}

impl Event {
    /// Creates an event recorded now.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            time: now_seconds(),
        }
    }

    /// Creates an event with an explicit timestamp.
    ///
    /// Used when reconstructing events from stored records and in tests;
    /// new events should use [`Event::new`].
    #[must_use]
    pub fn with_time(value: impl Into<String>, time: u64) -> Self {
        Self {
            value: value.into(),
            time,
        }
    }

    /// Returns the event value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the recording time in seconds since the Unix epoch.
    #[must_use]
    pub const fn time(&self) -> u64 {
        self.time
    }
}

/// All named events for one principal.
///
/// Stored as a single record in the backing store and replaced wholesale
/// on every write. The wire format is a flat JSON object keyed by event
/// name, e.g. `{"ACCESS_TOKENS": {"value": "[...]", "time": 1699999999}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventMap {
    events: HashMap<String, Event>,
}

impl EventMap {
    /// Creates an empty event map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an event map from its stored JSON form.
    ///
    /// ## Errors
    ///
    /// Returns a decode error if the text is not a valid event map.
    pub fn parse(text: &str) -> EventsResult<Self> {
        serde_json::from_str(text).map_err(|e| EventsError::decode("event map", e))
    }

    /// Encodes the event map to its stored JSON form.
    ///
    /// ## Errors
    ///
    /// Returns an encode error if serialization fails.
    pub fn serialize(&self) -> EventsResult<String> {
        serde_json::to_string(self).map_err(|e| EventsError::encode("event map", e))
    }

    /// Returns the named event, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Event> {
        self.events.get(name)
    }

    /// Inserts or replaces the named event.
    pub fn insert(&mut self, name: impl Into<String>, event: Event) {
        self.events.insert(name.into(), event);
    }

    /// Removes the named event, returning it if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Event> {
        self.events.remove(name)
    }

    /// Returns the number of events in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Checks whether the map holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates over `(name, event)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Event)> {
        self.events.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn now_seconds() -> u64 {
    // Unix time is non-negative for any realistic clock.
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}
