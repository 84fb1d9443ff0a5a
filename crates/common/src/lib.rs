//! Shared identifiers and the static topic/event-type registry.

pub mod topics;
pub mod types;

pub use topics::{EventType, RegistryError, Topic};
pub use types::{EntityId, EventId};
