//! Projection error types.

use common::EventType;
use thiserror::Error;

/// Errors that can occur while applying an event to the projection.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The store rejected a write; the unit of work was rolled back.
    #[error("Store error: {0}")]
    Store(#[from] analytics_store::StoreError),

    /// A projector was handed an event type it does not own.
    #[error("{projector} does not handle {event_type}")]
    UnexpectedEvent {
        projector: &'static str,
        event_type: EventType,
    },
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
