//! Event schema for the analytics projection pipeline.
//!
//! This crate provides:
//! - The wire envelope shared by every topic
//! - ISO-8601 timestamp normalization
//! - Typed payloads for each aggregate
//! - `DomainEvent`, the decoded form handed to projectors

pub mod envelope;
pub mod error;
pub mod event;
pub mod payloads;
pub mod timestamp;

pub use envelope::{EventEnvelope, EventEnvelopeBuilder};
pub use error::{DecodeError, TimestampError};
pub use event::{DomainEvent, EventPayload};
pub use payloads::{
    DeletionPayload, OrderCancelledPayload, OrderItem, OrderPayload, PostPayload, ProductPayload,
    ProductVariant, SupplierPayload, UserPayload,
};
pub use timestamp::{parse_optional_timestamp, parse_timestamp};
