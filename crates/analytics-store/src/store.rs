use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::rows::{
    EventStamp, OrderItemRow, OrderRow, PostRow, ProductRow, ProductVariantRow, SupplierRow,
    UserRow,
};

/// Write side of the relational projection.
///
/// Every method runs in its own unit of work: parent and child writes made by
/// one call commit together or not at all. Upserts are last-writer-wins on
/// every column except `created_at`, which keeps the first non-null value.
/// Methods returning `u64` report affected rows; zero is not an error.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn upsert_user(&self, row: &UserRow) -> Result<()>;

    /// Marks a user deleted without removing the row.
    async fn soft_delete_user(
        &self,
        user_id: &str,
        deleted_at: DateTime<Utc>,
        stamp: &EventStamp,
    ) -> Result<u64>;

    async fn upsert_supplier(&self, row: &SupplierRow) -> Result<()>;

    async fn delete_supplier(&self, supplier_id: &str) -> Result<u64>;

    /// Upserts a product and replaces its variants.
    async fn upsert_product(
        &self,
        product: &ProductRow,
        variants: &[ProductVariantRow],
    ) -> Result<()>;

    /// Removes a product together with its variants.
    async fn delete_product(&self, product_id: &str) -> Result<u64>;

    /// Upserts an order header and replaces its items.
    async fn upsert_order(&self, order: &OrderRow, items: &[OrderItemRow]) -> Result<()>;

    /// Sets every order with this order number to `cancelled`.
    async fn cancel_order(
        &self,
        order_number: &str,
        reason: Option<&str>,
        stamp: &EventStamp,
    ) -> Result<u64>;

    async fn upsert_post(&self, row: &PostRow) -> Result<()>;

    /// Marks a post deleted without removing the row.
    async fn soft_delete_post(
        &self,
        post_id: &str,
        deleted_at: DateTime<Utc>,
        stamp: &EventStamp,
    ) -> Result<u64>;

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRow>>;

    async fn get_supplier(&self, supplier_id: &str) -> Result<Option<SupplierRow>>;

    async fn get_product(&self, product_id: &str) -> Result<Option<ProductRow>>;

    /// Variants ordered by variant key.
    async fn get_product_variants(&self, product_id: &str) -> Result<Vec<ProductVariantRow>>;

    async fn get_order(&self, order_id: &str) -> Result<Option<OrderRow>>;

    /// Items ordered by item id.
    async fn get_order_items(&self, order_id: &str) -> Result<Vec<OrderItemRow>>;

    async fn get_post(&self, post_id: &str) -> Result<Option<PostRow>>;
}

#[async_trait]
impl<T: AnalyticsStore + ?Sized> AnalyticsStore for Arc<T> {
    async fn upsert_user(&self, row: &UserRow) -> Result<()> {
        (**self).upsert_user(row).await
    }

    async fn soft_delete_user(
        &self,
        user_id: &str,
        deleted_at: DateTime<Utc>,
        stamp: &EventStamp,
    ) -> Result<u64> {
        (**self).soft_delete_user(user_id, deleted_at, stamp).await
    }

    async fn upsert_supplier(&self, row: &SupplierRow) -> Result<()> {
        (**self).upsert_supplier(row).await
    }

    async fn delete_supplier(&self, supplier_id: &str) -> Result<u64> {
        (**self).delete_supplier(supplier_id).await
    }

    async fn upsert_product(
        &self,
        product: &ProductRow,
        variants: &[ProductVariantRow],
    ) -> Result<()> {
        (**self).upsert_product(product, variants).await
    }

    async fn delete_product(&self, product_id: &str) -> Result<u64> {
        (**self).delete_product(product_id).await
    }

    async fn upsert_order(&self, order: &OrderRow, items: &[OrderItemRow]) -> Result<()> {
        (**self).upsert_order(order, items).await
    }

    async fn cancel_order(
        &self,
        order_number: &str,
        reason: Option<&str>,
        stamp: &EventStamp,
    ) -> Result<u64> {
        (**self).cancel_order(order_number, reason, stamp).await
    }

    async fn upsert_post(&self, row: &PostRow) -> Result<()> {
        (**self).upsert_post(row).await
    }

    async fn soft_delete_post(
        &self,
        post_id: &str,
        deleted_at: DateTime<Utc>,
        stamp: &EventStamp,
    ) -> Result<u64> {
        (**self).soft_delete_post(post_id, deleted_at, stamp).await
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRow>> {
        (**self).get_user(user_id).await
    }

    async fn get_supplier(&self, supplier_id: &str) -> Result<Option<SupplierRow>> {
        (**self).get_supplier(supplier_id).await
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<ProductRow>> {
        (**self).get_product(product_id).await
    }

    async fn get_product_variants(&self, product_id: &str) -> Result<Vec<ProductVariantRow>> {
        (**self).get_product_variants(product_id).await
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<OrderRow>> {
        (**self).get_order(order_id).await
    }

    async fn get_order_items(&self, order_id: &str) -> Result<Vec<OrderItemRow>> {
        (**self).get_order_items(order_id).await
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<PostRow>> {
        (**self).get_post(post_id).await
    }
}
