//! Typed domain events.

use chrono::{DateTime, Utc};
use common::{EntityId, EventId, EventType};
use serde::de::DeserializeOwned;

use crate::envelope::EventEnvelope;
use crate::error::DecodeError;
use crate::payloads::{
    DeletionPayload, OrderCancelledPayload, OrderPayload, PostPayload, ProductPayload,
    SupplierPayload, UserPayload,
};

/// Payload of a decoded event, one variant per registered event type.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    UserCreated(UserPayload),
    UserDeleted(DeletionPayload),

    SupplierCreated(SupplierPayload),
    SupplierDeleted(DeletionPayload),

    ProductCreated(ProductPayload),
    ProductPublished(ProductPayload),
    ProductDeleted(DeletionPayload),

    OrderCreated(OrderPayload),
    OrderCancelled(OrderCancelledPayload),

    PostCreated(PostPayload),
    PostPublished(PostPayload),
    PostDeleted(DeletionPayload),
}

impl EventPayload {
    /// The registry entry this payload belongs to.
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::UserCreated(_) => EventType::UserCreated,
            EventPayload::UserDeleted(_) => EventType::UserDeleted,
            EventPayload::SupplierCreated(_) => EventType::SupplierCreated,
            EventPayload::SupplierDeleted(_) => EventType::SupplierDeleted,
            EventPayload::ProductCreated(_) => EventType::ProductCreated,
            EventPayload::ProductPublished(_) => EventType::ProductPublished,
            EventPayload::ProductDeleted(_) => EventType::ProductDeleted,
            EventPayload::OrderCreated(_) => EventType::OrderCreated,
            EventPayload::OrderCancelled(_) => EventType::OrderCancelled,
            EventPayload::PostCreated(_) => EventType::PostCreated,
            EventPayload::PostPublished(_) => EventType::PostPublished,
            EventPayload::PostDeleted(_) => EventType::PostDeleted,
        }
    }
}

/// An envelope whose event type has been resolved and whose payload has been decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainEvent {
    pub event_id: EventId,
    pub entity_id: EntityId,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl DomainEvent {
    /// Resolves the envelope's event type and decodes its payload.
    pub fn decode(envelope: &EventEnvelope) -> Result<Self, DecodeError> {
        let event_type: EventType = envelope.event_type.parse()?;
        Self::decode_as(event_type, envelope)
    }

    /// Decodes the payload of an envelope whose type is already resolved.
    pub fn decode_as(event_type: EventType, envelope: &EventEnvelope) -> Result<Self, DecodeError> {
        let data = envelope.data_or_empty();

        let payload = match event_type {
            EventType::UserCreated => EventPayload::UserCreated(payload(event_type, data)?),
            EventType::UserDeleted => EventPayload::UserDeleted(payload(event_type, data)?),
            EventType::SupplierCreated => EventPayload::SupplierCreated(payload(event_type, data)?),
            EventType::SupplierDeleted => EventPayload::SupplierDeleted(payload(event_type, data)?),
            EventType::ProductCreated => EventPayload::ProductCreated(payload(event_type, data)?),
            EventType::ProductPublished => {
                EventPayload::ProductPublished(payload(event_type, data)?)
            }
            EventType::ProductDeleted => EventPayload::ProductDeleted(payload(event_type, data)?),
            EventType::OrderCreated => EventPayload::OrderCreated(payload(event_type, data)?),
            EventType::OrderCancelled => EventPayload::OrderCancelled(payload(event_type, data)?),
            EventType::PostCreated => EventPayload::PostCreated(payload(event_type, data)?),
            EventType::PostPublished => EventPayload::PostPublished(payload(event_type, data)?),
            EventType::PostDeleted => EventPayload::PostDeleted(payload(event_type, data)?),
        };

        Ok(Self {
            event_id: envelope.event_id.clone(),
            entity_id: envelope.entity_id.clone(),
            timestamp: envelope.timestamp,
            payload,
        })
    }

    /// Returns the event type.
    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

fn payload<T: DeserializeOwned>(
    event_type: EventType,
    data: serde_json::Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::Payload { event_type, source })
}
