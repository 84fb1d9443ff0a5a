use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::Result;
use crate::rows::{
    EventStamp, OrderItemRow, OrderRow, PostRow, ProductRow, ProductVariantRow, SupplierRow,
    UserRow,
};
use crate::store::AnalyticsStore;

#[derive(Default)]
struct Tables {
    users: BTreeMap<String, UserRow>,
    suppliers: BTreeMap<String, SupplierRow>,
    products: BTreeMap<String, ProductRow>,
    product_variants: BTreeMap<(String, String), ProductVariantRow>,
    orders: BTreeMap<String, OrderRow>,
    order_items: BTreeMap<(String, String), OrderItemRow>,
    posts: BTreeMap<String, PostRow>,
}

/// Keeps a non-null `created_at` from the existing row.
fn keep_created_at(
    existing: Option<Option<DateTime<Utc>>>,
    incoming: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    existing.flatten().or(incoming)
}

/// In-memory analytics store implementation for testing.
///
/// This implementation keeps every table in memory behind one lock and
/// provides the same semantics as the PostgreSQL implementation, including
/// write-once `created_at`, child replacement and cascading deletes.
/// Child rows are expected to carry unique keys; the projectors dedupe them.
#[derive(Clone, Default)]
pub struct InMemoryAnalyticsStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryAnalyticsStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows in each table, keyed by table name.
    pub async fn row_counts(&self) -> BTreeMap<&'static str, usize> {
        let tables = self.tables.read().await;
        BTreeMap::from([
            ("users", tables.users.len()),
            ("suppliers", tables.suppliers.len()),
            ("products", tables.products.len()),
            ("product_variants", tables.product_variants.len()),
            ("orders", tables.orders.len()),
            ("order_items", tables.order_items.len()),
            ("posts", tables.posts.len()),
        ])
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn upsert_user(&self, row: &UserRow) -> Result<()> {
        let mut tables = self.tables.write().await;
        let mut row = row.clone();
        row.created_at = keep_created_at(
            tables.users.get(&row.user_id).map(|r| r.created_at),
            row.created_at,
        );
        tables.users.insert(row.user_id.clone(), row);
        Ok(())
    }

    async fn soft_delete_user(
        &self,
        user_id: &str,
        deleted_at: DateTime<Utc>,
        stamp: &EventStamp,
    ) -> Result<u64> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(user_id) {
            Some(row) => {
                row.deleted_at = Some(deleted_at);
                row.event_id = stamp.event_id.clone();
                row.event_timestamp = stamp.event_timestamp;
                1
            }
            None => 0,
        })
    }

    async fn upsert_supplier(&self, row: &SupplierRow) -> Result<()> {
        let mut tables = self.tables.write().await;
        let mut row = row.clone();
        row.created_at = keep_created_at(
            tables.suppliers.get(&row.supplier_id).map(|r| r.created_at),
            row.created_at,
        );
        tables.suppliers.insert(row.supplier_id.clone(), row);
        Ok(())
    }

    async fn delete_supplier(&self, supplier_id: &str) -> Result<u64> {
        let mut tables = self.tables.write().await;
        Ok(tables.suppliers.remove(supplier_id).map_or(0, |_| 1))
    }

    async fn upsert_product(
        &self,
        product: &ProductRow,
        variants: &[ProductVariantRow],
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let mut product = product.clone();
        product.created_at = keep_created_at(
            tables.products.get(&product.product_id).map(|r| r.created_at),
            product.created_at,
        );

        let product_id = product.product_id.clone();
        tables
            .product_variants
            .retain(|(owner, _), _| *owner != product_id);
        for variant in variants {
            tables.product_variants.insert(
                (product_id.clone(), variant.variant_key.clone()),
                variant.clone(),
            );
        }
        tables.products.insert(product_id, product);
        Ok(())
    }

    async fn delete_product(&self, product_id: &str) -> Result<u64> {
        let mut tables = self.tables.write().await;
        tables
            .product_variants
            .retain(|(owner, _), _| owner != product_id);
        Ok(tables.products.remove(product_id).map_or(0, |_| 1))
    }

    async fn upsert_order(&self, order: &OrderRow, items: &[OrderItemRow]) -> Result<()> {
        let mut tables = self.tables.write().await;
        let mut order = order.clone();
        order.created_at = keep_created_at(
            tables.orders.get(&order.order_id).map(|r| r.created_at),
            order.created_at,
        );

        let order_id = order.order_id.clone();
        tables.order_items.retain(|(owner, _), _| *owner != order_id);
        for item in items {
            tables
                .order_items
                .insert((order_id.clone(), item.item_id.clone()), item.clone());
        }
        tables.orders.insert(order_id, order);
        Ok(())
    }

    async fn cancel_order(
        &self,
        order_number: &str,
        reason: Option<&str>,
        stamp: &EventStamp,
    ) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let mut affected = 0;
        for order in tables
            .orders
            .values_mut()
            .filter(|o| o.order_number == order_number)
        {
            order.status = "cancelled".to_string();
            order.cancellation_reason = reason.map(str::to_string);
            order.event_id = stamp.event_id.clone();
            order.event_timestamp = stamp.event_timestamp;
            affected += 1;
        }
        Ok(affected)
    }

    async fn upsert_post(&self, row: &PostRow) -> Result<()> {
        let mut tables = self.tables.write().await;
        let mut row = row.clone();
        row.created_at = keep_created_at(
            tables.posts.get(&row.post_id).map(|r| r.created_at),
            row.created_at,
        );
        tables.posts.insert(row.post_id.clone(), row);
        Ok(())
    }

    async fn soft_delete_post(
        &self,
        post_id: &str,
        deleted_at: DateTime<Utc>,
        stamp: &EventStamp,
    ) -> Result<u64> {
        let mut tables = self.tables.write().await;
        Ok(match tables.posts.get_mut(post_id) {
            Some(row) => {
                row.deleted_at = Some(deleted_at);
                row.event_id = stamp.event_id.clone();
                row.event_timestamp = stamp.event_timestamp;
                1
            }
            None => 0,
        })
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRow>> {
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }

    async fn get_supplier(&self, supplier_id: &str) -> Result<Option<SupplierRow>> {
        Ok(self.tables.read().await.suppliers.get(supplier_id).cloned())
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<ProductRow>> {
        Ok(self.tables.read().await.products.get(product_id).cloned())
    }

    async fn get_product_variants(&self, product_id: &str) -> Result<Vec<ProductVariantRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .product_variants
            .iter()
            .filter(|((owner, _), _)| owner == product_id)
            .map(|(_, variant)| variant.clone())
            .collect())
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<OrderRow>> {
        Ok(self.tables.read().await.orders.get(order_id).cloned())
    }

    async fn get_order_items(&self, order_id: &str) -> Result<Vec<OrderItemRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .order_items
            .iter()
            .filter(|((owner, _), _)| owner == order_id)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<PostRow>> {
        Ok(self.tables.read().await.posts.get(post_id).cloned())
    }
}
