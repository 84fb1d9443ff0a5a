//! `product.*` payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Snapshot carried by `product.created` and `product.published`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    #[serde(default)]
    pub supplier_id: Option<String>,

    /// Supplier fields cached on the product document.
    #[serde(default, deserialize_with = "null_as_default")]
    pub supplier_info: SupplierInfo,

    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit_type: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ProductMetadata,

    /// Variants keyed by variant key (the variant's display name in the source).
    #[serde(default, deserialize_with = "null_as_default")]
    pub variants: BTreeMap<String, ProductVariant>,

    #[serde(default)]
    pub base_price_cents: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub stats: ProductStats,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierInfo {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    #[serde(default)]
    pub base_sku: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub favorite_count: i64,
    #[serde(default)]
    pub purchase_count: i64,
    #[serde(default)]
    pub total_reviews: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub variant_id: String,
    pub variant_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Vec<VariantAttribute>,

    pub price_cents: i64,
    #[serde(default)]
    pub cost_cents: Option<i64>,
    #[serde(default)]
    pub quantity: i64,

    #[serde(default)]
    pub package_dimensions: Option<PackageDimensions>,

    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantAttribute {
    pub attribute_name: String,
    pub attribute_value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackageDimensions {
    pub width_cm: f64,
    pub height_cm: f64,
    pub depth_cm: f64,
}
