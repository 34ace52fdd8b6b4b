//! Error types for event and payload (de)serialization.

use thiserror::Error;

/// Errors that can occur when decoding or encoding event payloads.
#[derive(Debug, Error)]
pub enum EventsError {
    /// A payload could not be decoded from JSON.
    #[error("failed to decode {payload} payload: {source}")]
    Decode {
        /// Which payload type was being decoded.
        payload: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A payload could not be encoded to JSON.
    #[error("failed to encode {payload} payload: {source}")]
    Encode {
        /// Which payload type was being encoded.
        payload: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl EventsError {
    /// Creates a decode error for the named payload type.
    #[must_use]
    pub const fn decode(payload: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { payload, source }
    }

    /// Creates an encode error for the named payload type.
    #[must_use]
    pub const fn encode(payload: &'static str, source: serde_json::Error) -> Self {
        Self::Encode { payload, source }
    }

    /// Checks if this is a decode error.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Result type for event payload operations.
pub type EventsResult<T> = Result<T, EventsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_payload() {
        let source = serde_json::from_str::<Vec<String>>("not json").unwrap_err();
        let err = EventsError::decode("login events", source);

        assert!(err.is_decode());
        assert!(err.to_string().contains("login events"));
    }
}
