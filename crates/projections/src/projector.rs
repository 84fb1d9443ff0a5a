//! Handler and projector traits.

use std::collections::HashMap;
use std::sync::Arc;

use analytics_store::EventStamp;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::EventType;
use domain::{DeletionPayload, DomainEvent};

use crate::{ProjectionError, Result};

/// Applies a decoded event to the projection.
///
/// Handlers must be idempotent: the log delivers at least once, and replaying
/// an event must leave the projection unchanged.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Returns the name of this handler.
    fn name(&self) -> &'static str;

    /// Handles a single event.
    async fn handle(&self, event: &DomainEvent) -> Result<()>;
}

/// Event type to handler mapping used to populate a dispatcher.
pub type HandlerMap = HashMap<EventType, Arc<dyn EventHandler>>;

/// A handler that owns a fixed set of event types.
pub trait Projector: EventHandler + Sized + 'static {
    /// Event types this projector handles.
    const EVENT_TYPES: &'static [EventType];

    /// Maps every owned event type to this projector.
    fn handlers(self: Arc<Self>) -> HandlerMap {
        Self::EVENT_TYPES
            .iter()
            .map(|event_type| (*event_type, Arc::clone(&self) as Arc<dyn EventHandler>))
            .collect()
    }

    /// Error for an event outside [`Self::EVENT_TYPES`].
    fn unexpected(&self, event: &DomainEvent) -> ProjectionError {
        ProjectionError::UnexpectedEvent {
            projector: self.name(),
            event_type: event.event_type(),
        }
    }
}

/// Bookkeeping stamp for the rows an event writes.
pub(crate) fn stamp(event: &DomainEvent) -> EventStamp {
    EventStamp::new(event.event_id.as_str(), event.timestamp)
}

/// Deletion time: the one sent by the source, else the event time.
pub(crate) fn deletion_time(event: &DomainEvent, payload: &DeletionPayload) -> DateTime<Utc> {
    payload.deleted_at.unwrap_or(event.timestamp)
}

pub(crate) fn record_applied(entity: &'static str, event: &DomainEvent) {
    metrics::counter!("projections_events_applied", "entity" => entity).increment(1);
    tracing::debug!(
        entity,
        event_type = %event.event_type(),
        entity_id = %event.entity_id,
        "event applied"
    );
}

/// Zero affected rows is expected for out-of-order or unknown entities.
pub(crate) fn record_affected(entity: &'static str, event: &DomainEvent, affected: u64) {
    if affected == 0 {
        tracing::debug!(
            entity,
            event_type = %event.event_type(),
            entity_id = %event.entity_id,
            "no rows affected"
        );
    }
}
