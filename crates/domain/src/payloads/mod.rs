//! Typed payloads, one module per aggregate.
//!
//! Payloads mirror the aggregate snapshot carried in `data`. Nested objects
//! are optional on the wire: a missing or `null` object decodes to its empty
//! default, so handlers never have to special-case absent sections.

pub mod order;
pub mod post;
pub mod product;
pub mod supplier;
pub mod user;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub use order::{OrderCancelledPayload, OrderItem, OrderPayload, ProductSnapshot, ShippingAddress};
pub use post::{LinkPreview, PostAuthor, PostPayload, PostStats};
pub use product::{
    PackageDimensions, ProductMetadata, ProductPayload, ProductStats, ProductVariant,
    SupplierInfo, VariantAttribute,
};
pub use supplier::{
    BankingInfo, BusinessInfo, CompanyAddress, CompanyInfo, SupplierContactInfo, SupplierPayload,
};
pub use user::{UserContactInfo, UserPayload, UserProfile};

/// Payload of every `*.deleted` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeletionPayload {
    /// Deletion time as recorded by the source, when it sends one.
    #[serde(default, with = "crate::timestamp::option_iso8601")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Deserializes `null` (or a missing field, with `#[serde(default)]`) as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
