//! Static catalog of topics and event types.
//!
//! Every event type lives on exactly one topic, named after the aggregate
//! family it describes. The consumer subscribes from [`Topic::ALL`] and
//! routes with [`EventType`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when resolving registry names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The string does not name a known topic.
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    /// The string does not name a known event type.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),
}

/// Log topics, one per aggregate family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    User,
    Order,
    Post,
    Product,
    Supplier,
}

impl Topic {
    /// Every known topic, in subscription order.
    pub const ALL: [Topic; 5] = [
        Topic::User,
        Topic::Order,
        Topic::Post,
        Topic::Product,
        Topic::Supplier,
    ];

    /// Returns the topic name as it appears on the log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::User => "user",
            Topic::Order => "order",
            Topic::Post => "post",
            Topic::Product => "product",
            Topic::Supplier => "supplier",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownTopic(s.to_string()))
    }
}

/// Event types in `entity.action` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "user.created")]
    UserCreated,
    #[serde(rename = "user.deleted")]
    UserDeleted,
    #[serde(rename = "supplier.created")]
    SupplierCreated,
    #[serde(rename = "supplier.deleted")]
    SupplierDeleted,
    #[serde(rename = "product.created")]
    ProductCreated,
    #[serde(rename = "product.deleted")]
    ProductDeleted,
    #[serde(rename = "product.published")]
    ProductPublished,
    #[serde(rename = "order.created")]
    OrderCreated,
    #[serde(rename = "order.cancelled")]
    OrderCancelled,
    #[serde(rename = "post.created")]
    PostCreated,
    #[serde(rename = "post.deleted")]
    PostDeleted,
    #[serde(rename = "post.published")]
    PostPublished,
}

impl EventType {
    /// Every event type the pipeline understands.
    pub const ALL: [EventType; 12] = [
        EventType::UserCreated,
        EventType::UserDeleted,
        EventType::SupplierCreated,
        EventType::SupplierDeleted,
        EventType::ProductCreated,
        EventType::ProductDeleted,
        EventType::ProductPublished,
        EventType::OrderCreated,
        EventType::OrderCancelled,
        EventType::PostCreated,
        EventType::PostDeleted,
        EventType::PostPublished,
    ];

    /// Returns the wire name (`entity.action`).
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::UserCreated => "user.created",
            EventType::UserDeleted => "user.deleted",
            EventType::SupplierCreated => "supplier.created",
            EventType::SupplierDeleted => "supplier.deleted",
            EventType::ProductCreated => "product.created",
            EventType::ProductDeleted => "product.deleted",
            EventType::ProductPublished => "product.published",
            EventType::OrderCreated => "order.created",
            EventType::OrderCancelled => "order.cancelled",
            EventType::PostCreated => "post.created",
            EventType::PostDeleted => "post.deleted",
            EventType::PostPublished => "post.published",
        }
    }

    /// Returns the topic this event type is published on.
    pub fn topic(&self) -> Topic {
        match self {
            EventType::UserCreated | EventType::UserDeleted => Topic::User,
            EventType::SupplierCreated | EventType::SupplierDeleted => Topic::Supplier,
            EventType::ProductCreated | EventType::ProductDeleted | EventType::ProductPublished => {
                Topic::Product
            }
            EventType::OrderCreated | EventType::OrderCancelled => Topic::Order,
            EventType::PostCreated | EventType::PostDeleted | EventType::PostPublished => {
                Topic::Post
            }
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|event_type| event_type.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownEventType(s.to_string()))
    }
}
