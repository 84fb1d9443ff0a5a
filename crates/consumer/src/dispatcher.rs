//! Routes raw log payloads to the handler registered for their event type.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use common::EventType;
use domain::{DomainEvent, EventEnvelope};
use projections::{EventHandler, HandlerMap};

/// What happened to a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// The handler applied the event.
    Applied,
    /// The envelope or its typed payload could not be decoded.
    DecodeFailed,
    /// The envelope names an event type outside the registry.
    UnknownEventType,
    /// The event type is known but no handler is registered for it.
    Unhandled,
    /// The handler returned an error.
    HandlerFailed,
}

impl DispatchOutcome {
    /// Label used for the `outcome` metric dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Applied => "applied",
            DispatchOutcome::DecodeFailed => "decode_failed",
            DispatchOutcome::UnknownEventType => "unknown_event_type",
            DispatchOutcome::Unhandled => "unhandled",
            DispatchOutcome::HandlerFailed => "handler_failed",
        }
    }
}

impl std::fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event type to handler routing table.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<EventType, Arc<dyn EventHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event_type`. The last registration wins.
    pub fn register_handler(&mut self, event_type: EventType, handler: Arc<dyn EventHandler>) {
        let name = handler.name();
        if let Some(previous) = self.handlers.insert(event_type, handler) {
            tracing::warn!(
                %event_type,
                previous = previous.name(),
                handler = name,
                "replacing registered handler"
            );
        } else {
            tracing::debug!(%event_type, handler = name, "handler registered");
        }
    }

    /// Registers every entry of `handlers`.
    pub fn register_all(&mut self, handlers: HandlerMap) {
        for (event_type, handler) in handlers {
            self.register_handler(event_type, handler);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn handles(&self, event_type: EventType) -> bool {
        self.handlers.contains_key(&event_type)
    }

    /// Decodes `payload` and runs the matching handler.
    ///
    /// Never fails: every problem is logged and reported as an outcome so
    /// the caller can move on to the next message.
    pub async fn dispatch(&self, payload: &[u8]) -> DispatchOutcome {
        let envelope = match EventEnvelope::from_slice(payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!(error = %err, "malformed event envelope, skipping");
                return DispatchOutcome::DecodeFailed;
            }
        };

        let event_type = match envelope.event_type.parse::<EventType>() {
            Ok(event_type) => event_type,
            Err(_) => {
                tracing::warn!(
                    event_id = %envelope.event_id,
                    event_type = %envelope.event_type,
                    "unknown event type, skipping"
                );
                return DispatchOutcome::UnknownEventType;
            }
        };

        let Some(handler) = self.handlers.get(&event_type) else {
            tracing::warn!(
                event_id = %envelope.event_id,
                %event_type,
                "no handler registered, skipping"
            );
            return DispatchOutcome::Unhandled;
        };

        let event = match DomainEvent::decode_as(event_type, &envelope) {
            Ok(event) => event,
            Err(err) => {
                tracing::error!(
                    event_id = %envelope.event_id,
                    %event_type,
                    entity_id = %envelope.entity_id,
                    error = %err,
                    "invalid event payload, skipping"
                );
                return DispatchOutcome::DecodeFailed;
            }
        };

        let started = Instant::now();
        let result = handler.handle(&event).await;
        metrics::histogram!(
            "consumer_handler_duration_seconds",
            "event_type" => event_type.as_str()
        )
        .record(started.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                tracing::debug!(
                    event_id = %event.event_id,
                    %event_type,
                    entity_id = %event.entity_id,
                    handler = handler.name(),
                    "event handled"
                );
                DispatchOutcome::Applied
            }
            Err(err) => {
                tracing::error!(
                    event_id = %event.event_id,
                    %event_type,
                    entity_id = %event.entity_id,
                    handler = handler.name(),
                    error = %err,
                    "handler failed, skipping"
                );
                DispatchOutcome::HandlerFailed
            }
        }
    }
}
