//! Relational projection store.
//!
//! This crate provides:
//! - `Database`, the bounded connection pool and its units of work
//! - Typed table descriptors and idempotent schema creation
//! - The `AnalyticsStore` trait with PostgreSQL and in-memory implementations

pub mod database;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod rows;
pub mod schema;
pub mod store;

pub use database::{Database, DatabaseConfig, UnitOfWork};
pub use error::{Result, StoreError};
pub use memory::InMemoryAnalyticsStore;
pub use postgres::PostgresAnalyticsStore;
pub use rows::{
    EventStamp, OrderItemRow, OrderRow, PostRow, ProductRow, ProductVariantRow, SupplierRow,
    UserRow,
};
pub use schema::{TABLES, TableDef, ensure_schema};
pub use store::AnalyticsStore;
