use chrono::{DateTime, Utc};
use common::{EntityId, EventId};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// The outer structure of every message on the log.
///
/// The envelope is decoded once at the boundary; `data` stays raw JSON until
/// the event type has been resolved, then it is decoded into a typed payload
/// by [`crate::DomainEvent::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Globally unique event identifier.
    pub event_id: EventId,

    /// Dotted `entity.action` event type.
    pub event_type: String,

    /// Identifier of the affected aggregate in the system of record.
    pub entity_id: EntityId,

    /// When the event was produced.
    #[serde(with = "crate::timestamp::iso8601")]
    pub timestamp: DateTime<Utc>,

    /// Event-type-specific snapshot of the aggregate.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl EventEnvelope {
    /// Creates a new envelope builder.
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }

    /// Decodes an envelope from UTF-8 JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes).map_err(DecodeError::Envelope)
    }

    /// Encodes the envelope as JSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Returns the payload, treating a missing or `null` payload as `{}`.
    pub fn data_or_empty(&self) -> serde_json::Value {
        if self.data.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            self.data.clone()
        }
    }
}

/// Builder for constructing envelopes, mostly in tests and tooling.
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    event_id: Option<EventId>,
    event_type: Option<String>,
    entity_id: Option<EntityId>,
    timestamp: Option<DateTime<Utc>>,
    data: Option<serde_json::Value>,
}

impl EventEnvelopeBuilder {
    /// Sets the event ID. If not set, a new ID will be generated.
    pub fn event_id(mut self, id: impl Into<EventId>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the entity ID.
    pub fn entity_id(mut self, id: impl Into<EntityId>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Sets the timestamp. If not set, the current time will be used.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the payload from a raw JSON value.
    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Builds the envelope.
    ///
    /// # Panics
    ///
    /// Panics if `event_type` or `entity_id` is not set.
    pub fn build(self) -> EventEnvelope {
        EventEnvelope {
            event_id: self.event_id.unwrap_or_default(),
            event_type: self.event_type.expect("event_type is required"),
            entity_id: self.entity_id.expect("entity_id is required"),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            data: self.data.unwrap_or(serde_json::Value::Null),
        }
    }
}
