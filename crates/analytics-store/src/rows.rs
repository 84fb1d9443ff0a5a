//! Row types, one per projection table.
//!
//! Field names match column names so rows can be read back with `FromRow`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Bookkeeping recorded on every parent row: the last event applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStamp {
    pub event_id: String,
    pub event_timestamp: DateTime<Utc>,
}

impl EventStamp {
    pub fn new(event_id: impl Into<String>, event_timestamp: DateTime<Utc>) -> Self {
        Self {
            event_id: event_id.into(),
            event_timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub version: i64,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub event_id: String,
    pub event_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SupplierRow {
    pub supplier_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub contact_person_name: Option<String>,
    pub contact_person_title: Option<String>,
    pub contact_person_email: Option<String>,
    pub contact_person_phone: Option<String>,
    pub legal_name: Option<String>,
    pub dba_name: Option<String>,
    pub street_address_1: Option<String>,
    pub street_address_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub support_email: Option<String>,
    pub support_phone: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub linkedin_url: Option<String>,
    pub timezone: Option<String>,
    pub bank_name: Option<String>,
    pub account_holder_name: Option<String>,
    pub account_number_last4: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub event_id: String,
    pub event_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProductRow {
    pub product_id: String,
    pub supplier_id: Option<String>,
    pub supplier_name: Option<String>,
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub category: Option<String>,
    pub unit_type: Option<String>,
    pub base_sku: Option<String>,
    pub brand: Option<String>,
    pub base_price_cents: i64,
    pub status: Option<String>,
    pub variant_count: i64,
    pub view_count: i64,
    pub favorite_count: i64,
    pub purchase_count: i64,
    pub total_reviews: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub event_id: String,
    pub event_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProductVariantRow {
    pub product_id: String,
    pub variant_key: String,
    pub variant_id: String,
    pub variant_name: String,
    /// `{attribute_name: attribute_value}` object.
    pub attributes: serde_json::Value,
    pub price_cents: i64,
    pub cost_cents: Option<i64>,
    pub quantity: i64,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub depth_cm: Option<f64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderRow {
    pub order_id: String,
    pub order_number: String,
    pub customer_user_id: Option<String>,
    pub customer_display_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub recipient_name: Option<String>,
    pub shipping_phone: Option<String>,
    pub shipping_street_1: Option<String>,
    pub shipping_street_2: Option<String>,
    pub shipping_city: Option<String>,
    pub shipping_state: Option<String>,
    pub shipping_zip_code: Option<String>,
    pub shipping_country: Option<String>,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub item_count: i64,
    pub total_cents: i64,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub event_id: String,
    pub event_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderItemRow {
    pub order_id: String,
    pub item_id: String,
    pub product_id: Option<String>,
    pub supplier_id: Option<String>,
    pub product_name: Option<String>,
    pub variant_name: Option<String>,
    pub variant_attributes: serde_json::Value,
    pub image_url: Option<String>,
    pub supplier_name: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub final_price_cents: i64,
    pub total_cents: i64,
    pub fulfillment_status: String,
    pub shipped_quantity: i64,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PostRow {
    pub post_id: String,
    pub post_type: Option<String>,
    pub author_user_id: Option<String>,
    pub author_display_name: Option<String>,
    pub author_avatar: Option<String>,
    pub author_type: Option<String>,
    pub text_content: Option<String>,
    /// Media attachments, stored as a JSON array.
    pub media: serde_json::Value,
    pub link_url: Option<String>,
    pub link_title: Option<String>,
    pub link_description: Option<String>,
    pub link_image: Option<String>,
    pub link_site_name: Option<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub share_count: i64,
    pub save_count: i64,
    pub engagement_rate: f64,
    pub last_comment_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub event_id: String,
    pub event_timestamp: DateTime<Utc>,
}
