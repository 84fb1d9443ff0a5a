//! `order.*` payloads.
//!
//! Orders are flat on the wire: customer fields sit at the top level, and each
//! item embeds a snapshot of the product as it was at checkout time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Snapshot carried by `order.created`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    /// Human-facing order number, unique in the source system.
    pub order_number: String,

    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_display_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub shipping_address: ShippingAddress,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<OrderItem>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderPayload {
    /// Sum of item totals in cents, clamped at the `i64` bounds.
    pub fn total_cents(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |total, item| total.saturating_add(item.total_cents))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub street_1: Option<String>,
    #[serde(default)]
    pub street_2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub product_snapshot: ProductSnapshot,

    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit_price_cents: i64,
    #[serde(default)]
    pub final_price_cents: i64,
    #[serde(default)]
    pub total_cents: i64,

    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default)]
    pub shipped_quantity: i64,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub shipped_at: Option<DateTime<Utc>>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Product and variant fields frozen at order time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variant_attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub supplier_name: Option<String>,
}

/// Payload of `order.cancelled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelledPayload {
    pub order_number: String,
    #[serde(default)]
    pub reason: Option<String>,
}
