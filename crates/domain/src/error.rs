//! Event decoding error types.

use common::EventType;
use thiserror::Error;

/// A timestamp string that is not valid ISO-8601.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid ISO-8601 timestamp: {raw:?}")]
pub struct TimestampError {
    pub raw: String,
}

/// Errors that can occur while turning raw log bytes into a [`crate::DomainEvent`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The message is not a well-formed JSON envelope.
    #[error("Malformed event envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    /// The envelope names an event type outside the registry.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// The payload does not match the schema of its event type.
    #[error("Invalid payload for {event_type}: {source}")]
    Payload {
        event_type: EventType,
        #[source]
        source: serde_json::Error,
    },
}

impl From<common::RegistryError> for DecodeError {
    fn from(err: common::RegistryError) -> Self {
        match err {
            common::RegistryError::UnknownEventType(name)
            | common::RegistryError::UnknownTopic(name) => DecodeError::UnknownEventType(name),
        }
    }
}
