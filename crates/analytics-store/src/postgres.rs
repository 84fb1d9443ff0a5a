use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{Postgres, QueryBuilder};

use crate::rows::{
    EventStamp, OrderItemRow, OrderRow, PostRow, ProductRow, ProductVariantRow, SupplierRow,
    UserRow,
};
use crate::schema::{ORDER_ITEMS, ORDERS, POSTS, PRODUCT_VARIANTS, PRODUCTS, SUPPLIERS, USERS};
use crate::store::AnalyticsStore;
use crate::{Database, Result, UnitOfWork};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// PostgreSQL-backed analytics store.
#[derive(Debug, Clone)]
pub struct PostgresAnalyticsStore {
    db: Database,
}

impl PostgresAnalyticsStore {
    /// Creates a new store on top of an open pool.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Gets a reference to the database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn soft_delete(
        &self,
        table: &'static str,
        key: &'static str,
        id: &str,
        deleted_at: DateTime<Utc>,
        stamp: &EventStamp,
    ) -> Result<u64> {
        let sql = format!(
            "UPDATE {table} SET deleted_at = $2, event_id = $3, event_timestamp = $4 WHERE {key} = $1"
        );

        let mut tx = self.db.unit_of_work().await?;
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(deleted_at)
            .bind(&stamp.event_id)
            .bind(stamp.event_timestamp)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }

    async fn replace_variants(
        tx: &mut UnitOfWork,
        product_id: &str,
        variants: &[ProductVariantRow],
    ) -> Result<()> {
        sqlx::query("DELETE FROM product_variants WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut **tx)
            .await?;

        if variants.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new(PRODUCT_VARIANTS.insert_prefix());
        builder.push_values(variants, |mut row, v| {
            row.push_bind(v.product_id.as_str())
                .push_bind(v.variant_key.as_str())
                .push_bind(v.variant_id.as_str())
                .push_bind(v.variant_name.as_str())
                .push_bind(&v.attributes)
                .push_bind(v.price_cents)
                .push_bind(v.cost_cents)
                .push_bind(v.quantity)
                .push_bind(v.width_cm)
                .push_bind(v.height_cm)
                .push_bind(v.depth_cm)
                .push_bind(v.image_url.as_deref());
        });
        builder.build().execute(&mut **tx).await?;

        Ok(())
    }

    async fn replace_items(
        tx: &mut UnitOfWork,
        order_id: &str,
        items: &[OrderItemRow],
    ) -> Result<()> {
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(&mut **tx)
            .await?;

        if items.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new(ORDER_ITEMS.insert_prefix());
        builder.push_values(items, |mut row, item| {
            row.push_bind(item.order_id.as_str())
                .push_bind(item.item_id.as_str())
                .push_bind(item.product_id.as_deref())
                .push_bind(item.supplier_id.as_deref())
                .push_bind(item.product_name.as_deref())
                .push_bind(item.variant_name.as_deref())
                .push_bind(&item.variant_attributes)
                .push_bind(item.image_url.as_deref())
                .push_bind(item.supplier_name.as_deref())
                .push_bind(item.quantity)
                .push_bind(item.unit_price_cents)
                .push_bind(item.final_price_cents)
                .push_bind(item.total_cents)
                .push_bind(item.fulfillment_status.as_str())
                .push_bind(item.shipped_quantity)
                .push_bind(item.tracking_number.as_deref())
                .push_bind(item.carrier.as_deref())
                .push_bind(item.shipped_at)
                .push_bind(item.delivered_at);
        });
        builder.build().execute(&mut **tx).await?;

        Ok(())
    }
}

fn bind_user<'q>(query: PgQuery<'q>, row: &'q UserRow) -> PgQuery<'q> {
    query
        .bind(&row.user_id)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(&row.display_name)
        .bind(&row.avatar)
        .bind(&row.bio)
        .bind(row.version)
        .bind(row.deleted_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(&row.event_id)
        .bind(row.event_timestamp)
}

fn bind_supplier<'q>(query: PgQuery<'q>, row: &'q SupplierRow) -> PgQuery<'q> {
    query
        .bind(&row.supplier_id)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(&row.contact_person_name)
        .bind(&row.contact_person_title)
        .bind(&row.contact_person_email)
        .bind(&row.contact_person_phone)
        .bind(&row.legal_name)
        .bind(&row.dba_name)
        .bind(&row.street_address_1)
        .bind(&row.street_address_2)
        .bind(&row.city)
        .bind(&row.state)
        .bind(&row.zip_code)
        .bind(&row.country)
        .bind(&row.support_email)
        .bind(&row.support_phone)
        .bind(&row.facebook_url)
        .bind(&row.instagram_handle)
        .bind(&row.twitter_handle)
        .bind(&row.linkedin_url)
        .bind(&row.timezone)
        .bind(&row.bank_name)
        .bind(&row.account_holder_name)
        .bind(&row.account_number_last4)
        .bind(row.deleted_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(&row.event_id)
        .bind(row.event_timestamp)
}

fn bind_product<'q>(query: PgQuery<'q>, row: &'q ProductRow) -> PgQuery<'q> {
    query
        .bind(&row.product_id)
        .bind(&row.supplier_id)
        .bind(&row.supplier_name)
        .bind(&row.name)
        .bind(&row.short_description)
        .bind(&row.category)
        .bind(&row.unit_type)
        .bind(&row.base_sku)
        .bind(&row.brand)
        .bind(row.base_price_cents)
        .bind(&row.status)
        .bind(row.variant_count)
        .bind(row.view_count)
        .bind(row.favorite_count)
        .bind(row.purchase_count)
        .bind(row.total_reviews)
        .bind(row.published_at)
        .bind(row.deleted_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(&row.event_id)
        .bind(row.event_timestamp)
}

fn bind_order<'q>(query: PgQuery<'q>, row: &'q OrderRow) -> PgQuery<'q> {
    query
        .bind(&row.order_id)
        .bind(&row.order_number)
        .bind(&row.customer_user_id)
        .bind(&row.customer_display_name)
        .bind(&row.customer_email)
        .bind(&row.customer_phone)
        .bind(&row.recipient_name)
        .bind(&row.shipping_phone)
        .bind(&row.shipping_street_1)
        .bind(&row.shipping_street_2)
        .bind(&row.shipping_city)
        .bind(&row.shipping_state)
        .bind(&row.shipping_zip_code)
        .bind(&row.shipping_country)
        .bind(&row.status)
        .bind(&row.cancellation_reason)
        .bind(row.item_count)
        .bind(row.total_cents)
        .bind(row.deleted_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(&row.event_id)
        .bind(row.event_timestamp)
}

fn bind_post<'q>(query: PgQuery<'q>, row: &'q PostRow) -> PgQuery<'q> {
    query
        .bind(&row.post_id)
        .bind(&row.post_type)
        .bind(&row.author_user_id)
        .bind(&row.author_display_name)
        .bind(&row.author_avatar)
        .bind(&row.author_type)
        .bind(&row.text_content)
        .bind(&row.media)
        .bind(&row.link_url)
        .bind(&row.link_title)
        .bind(&row.link_description)
        .bind(&row.link_image)
        .bind(&row.link_site_name)
        .bind(row.view_count)
        .bind(row.like_count)
        .bind(row.comment_count)
        .bind(row.share_count)
        .bind(row.save_count)
        .bind(row.engagement_rate)
        .bind(row.last_comment_at)
        .bind(row.published_at)
        .bind(row.deleted_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(&row.event_id)
        .bind(row.event_timestamp)
}

#[async_trait]
impl AnalyticsStore for PostgresAnalyticsStore {
    #[tracing::instrument(skip(self, row), fields(user_id = %row.user_id))]
    async fn upsert_user(&self, row: &UserRow) -> Result<()> {
        let sql = USERS.upsert_sql();
        let mut tx = self.db.unit_of_work().await?;
        bind_user(sqlx::query(&sql), row).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, stamp))]
    async fn soft_delete_user(
        &self,
        user_id: &str,
        deleted_at: DateTime<Utc>,
        stamp: &EventStamp,
    ) -> Result<u64> {
        self.soft_delete("users", "user_id", user_id, deleted_at, stamp)
            .await
    }

    #[tracing::instrument(skip(self, row), fields(supplier_id = %row.supplier_id))]
    async fn upsert_supplier(&self, row: &SupplierRow) -> Result<()> {
        let sql = SUPPLIERS.upsert_sql();
        let mut tx = self.db.unit_of_work().await?;
        bind_supplier(sqlx::query(&sql), row)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_supplier(&self, supplier_id: &str) -> Result<u64> {
        let mut tx = self.db.unit_of_work().await?;
        let result = sqlx::query("DELETE FROM suppliers WHERE supplier_id = $1")
            .bind(supplier_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(
        skip(self, product, variants),
        fields(product_id = %product.product_id, variants = variants.len())
    )]
    async fn upsert_product(
        &self,
        product: &ProductRow,
        variants: &[ProductVariantRow],
    ) -> Result<()> {
        let sql = PRODUCTS.upsert_sql();
        let mut tx = self.db.unit_of_work().await?;

        bind_product(sqlx::query(&sql), product)
            .execute(&mut *tx)
            .await?;
        Self::replace_variants(&mut tx, &product.product_id, variants).await?;

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_product(&self, product_id: &str) -> Result<u64> {
        let mut tx = self.db.unit_of_work().await?;

        sqlx::query("DELETE FROM product_variants WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(
        skip(self, order, items),
        fields(order_id = %order.order_id, items = items.len())
    )]
    async fn upsert_order(&self, order: &OrderRow, items: &[OrderItemRow]) -> Result<()> {
        let sql = ORDERS.upsert_sql();
        let mut tx = self.db.unit_of_work().await?;

        bind_order(sqlx::query(&sql), order)
            .execute(&mut *tx)
            .await?;
        Self::replace_items(&mut tx, &order.order_id, items).await?;

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, stamp))]
    async fn cancel_order(
        &self,
        order_number: &str,
        reason: Option<&str>,
        stamp: &EventStamp,
    ) -> Result<u64> {
        let mut tx = self.db.unit_of_work().await?;
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'cancelled',
                cancellation_reason = $2,
                event_id = $3,
                event_timestamp = $4
            WHERE order_number = $1
            "#,
        )
        .bind(order_number)
        .bind(reason)
        .bind(&stamp.event_id)
        .bind(stamp.event_timestamp)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self, row), fields(post_id = %row.post_id))]
    async fn upsert_post(&self, row: &PostRow) -> Result<()> {
        let sql = POSTS.upsert_sql();
        let mut tx = self.db.unit_of_work().await?;
        bind_post(sqlx::query(&sql), row).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, stamp))]
    async fn soft_delete_post(
        &self,
        post_id: &str,
        deleted_at: DateTime<Utc>,
        stamp: &EventStamp,
    ) -> Result<u64> {
        self.soft_delete("posts", "post_id", post_id, deleted_at, stamp)
            .await
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRow>> {
        Ok(
            sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.db.pool())
                .await?,
        )
    }

    async fn get_supplier(&self, supplier_id: &str) -> Result<Option<SupplierRow>> {
        Ok(
            sqlx::query_as::<_, SupplierRow>("SELECT * FROM suppliers WHERE supplier_id = $1")
                .bind(supplier_id)
                .fetch_optional(self.db.pool())
                .await?,
        )
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<ProductRow>> {
        Ok(
            sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE product_id = $1")
                .bind(product_id)
                .fetch_optional(self.db.pool())
                .await?,
        )
    }

    async fn get_product_variants(&self, product_id: &str) -> Result<Vec<ProductVariantRow>> {
        Ok(sqlx::query_as::<_, ProductVariantRow>(
            "SELECT * FROM product_variants WHERE product_id = $1 ORDER BY variant_key",
        )
        .bind(product_id)
        .fetch_all(self.db.pool())
        .await?)
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<OrderRow>> {
        Ok(
            sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE order_id = $1")
                .bind(order_id)
                .fetch_optional(self.db.pool())
                .await?,
        )
    }

    async fn get_order_items(&self, order_id: &str) -> Result<Vec<OrderItemRow>> {
        Ok(sqlx::query_as::<_, OrderItemRow>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY item_id",
        )
        .bind(order_id)
        .fetch_all(self.db.pool())
        .await?)
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<PostRow>> {
        Ok(
            sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE post_id = $1")
                .bind(post_id)
                .fetch_optional(self.db.pool())
                .await?,
        )
    }
}
