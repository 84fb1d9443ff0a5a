//! Entity projectors for the relational analytics store.
//!
//! This crate turns decoded domain events into idempotent store writes:
//! - [`EventHandler`] applies one event to the projection
//! - [`Projector`] owns a fixed set of event types and maps them to itself
//! - One projector per aggregate: users, suppliers, products, orders, posts

pub mod error;
pub mod projector;
pub mod projectors;

pub use error::{ProjectionError, Result};
pub use projector::{EventHandler, HandlerMap, Projector};
pub use projectors::{
    OrderProjector, PostProjector, ProductProjector, SupplierProjector, UserProjector,
    all_handlers,
};
