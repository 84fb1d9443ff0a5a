//! Projection table definitions and idempotent schema creation.

use crate::{Database, Result, StoreError};

/// Postgres column types used by the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    BigInt,
    Double,
    Jsonb,
    TimestampTz,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::BigInt => "BIGINT",
            SqlType::Double => "DOUBLE PRECISION",
            SqlType::Jsonb => "JSONB",
            SqlType::TimestampTz => "TIMESTAMPTZ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
}

const fn required(name: &'static str, sql_type: SqlType) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        nullable: false,
    }
}

const fn optional(name: &'static str, sql_type: SqlType) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        nullable: true,
    }
}

/// A child-to-parent reference. Rows are removed with their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub columns: &'static [&'static str],
    pub parent_table: &'static str,
    pub parent_columns: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub primary_key: &'static [&'static str],
    pub foreign_key: Option<ForeignKey>,
    pub indexes: &'static [IndexDef],
}

impl TableDef {
    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_table_sql(&self) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|col| {
                let null = if col.nullable { "" } else { " NOT NULL" };
                format!("    {} {}{}", col.name, col.sql_type.as_sql(), null)
            })
            .collect();

        lines.push(format!("    PRIMARY KEY ({})", self.primary_key.join(", ")));

        if let Some(fk) = &self.foreign_key {
            lines.push(format!(
                "    FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE CASCADE",
                fk.columns.join(", "),
                fk.parent_table,
                fk.parent_columns.join(", ")
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            self.name,
            lines.join(",\n")
        )
    }

    /// `CREATE INDEX IF NOT EXISTS` statements for this table.
    pub fn create_index_sql(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|idx| {
                format!(
                    "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                    idx.name,
                    self.name,
                    idx.columns.join(", ")
                )
            })
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|col| col.name == name)
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|col| col.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `INSERT INTO t (..) ` prefix for bulk inserts; values follow column order.
    pub fn insert_prefix(&self) -> String {
        format!("INSERT INTO {} ({}) ", self.name, self.column_list())
    }

    /// Single-row insert-or-update keyed by the primary key, binding `$1..$n`
    /// in column order. `created_at` keeps its first non-null value.
    pub fn upsert_sql(&self) -> String {
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let updates = self
            .columns
            .iter()
            .filter(|col| !self.primary_key.contains(&col.name))
            .map(|col| match col.name {
                "created_at" => format!(
                    "created_at = COALESCE({}.created_at, EXCLUDED.created_at)",
                    self.name
                ),
                name => format!("{name} = EXCLUDED.{name}"),
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}",
            self.name,
            self.column_list(),
            placeholders,
            self.primary_key.join(", "),
            updates
        )
    }
}

use SqlType::{BigInt, Double, Jsonb, Text, TimestampTz};

pub const USERS: TableDef = TableDef {
    name: "users",
    columns: &[
        required("user_id", Text),
        optional("email", Text),
        optional("phone", Text),
        optional("display_name", Text),
        optional("avatar", Text),
        optional("bio", Text),
        required("version", BigInt),
        optional("deleted_at", TimestampTz),
        optional("created_at", TimestampTz),
        optional("updated_at", TimestampTz),
        required("event_id", Text),
        required("event_timestamp", TimestampTz),
    ],
    primary_key: &["user_id"],
    foreign_key: None,
    indexes: &[],
};

pub const SUPPLIERS: TableDef = TableDef {
    name: "suppliers",
    columns: &[
        required("supplier_id", Text),
        optional("email", Text),
        optional("phone", Text),
        optional("contact_person_name", Text),
        optional("contact_person_title", Text),
        optional("contact_person_email", Text),
        optional("contact_person_phone", Text),
        optional("legal_name", Text),
        optional("dba_name", Text),
        optional("street_address_1", Text),
        optional("street_address_2", Text),
        optional("city", Text),
        optional("state", Text),
        optional("zip_code", Text),
        optional("country", Text),
        optional("support_email", Text),
        optional("support_phone", Text),
        optional("facebook_url", Text),
        optional("instagram_handle", Text),
        optional("twitter_handle", Text),
        optional("linkedin_url", Text),
        optional("timezone", Text),
        optional("bank_name", Text),
        optional("account_holder_name", Text),
        optional("account_number_last4", Text),
        optional("deleted_at", TimestampTz),
        optional("created_at", TimestampTz),
        optional("updated_at", TimestampTz),
        required("event_id", Text),
        required("event_timestamp", TimestampTz),
    ],
    primary_key: &["supplier_id"],
    foreign_key: None,
    indexes: &[],
};

pub const PRODUCTS: TableDef = TableDef {
    name: "products",
    columns: &[
        required("product_id", Text),
        optional("supplier_id", Text),
        optional("supplier_name", Text),
        optional("name", Text),
        optional("short_description", Text),
        optional("category", Text),
        optional("unit_type", Text),
        optional("base_sku", Text),
        optional("brand", Text),
        required("base_price_cents", BigInt),
        optional("status", Text),
        required("variant_count", BigInt),
        required("view_count", BigInt),
        required("favorite_count", BigInt),
        required("purchase_count", BigInt),
        required("total_reviews", BigInt),
        optional("published_at", TimestampTz),
        optional("deleted_at", TimestampTz),
        optional("created_at", TimestampTz),
        optional("updated_at", TimestampTz),
        required("event_id", Text),
        required("event_timestamp", TimestampTz),
    ],
    primary_key: &["product_id"],
    foreign_key: None,
    indexes: &[IndexDef {
        name: "idx_products_supplier_id",
        columns: &["supplier_id"],
    }],
};

pub const PRODUCT_VARIANTS: TableDef = TableDef {
    name: "product_variants",
    columns: &[
        required("product_id", Text),
        required("variant_key", Text),
        required("variant_id", Text),
        required("variant_name", Text),
        required("attributes", Jsonb),
        required("price_cents", BigInt),
        optional("cost_cents", BigInt),
        required("quantity", BigInt),
        optional("width_cm", Double),
        optional("height_cm", Double),
        optional("depth_cm", Double),
        optional("image_url", Text),
    ],
    primary_key: &["product_id", "variant_key"],
    foreign_key: Some(ForeignKey {
        columns: &["product_id"],
        parent_table: "products",
        parent_columns: &["product_id"],
    }),
    indexes: &[],
};

pub const ORDERS: TableDef = TableDef {
    name: "orders",
    columns: &[
        required("order_id", Text),
        required("order_number", Text),
        optional("customer_user_id", Text),
        optional("customer_display_name", Text),
        optional("customer_email", Text),
        optional("customer_phone", Text),
        optional("recipient_name", Text),
        optional("shipping_phone", Text),
        optional("shipping_street_1", Text),
        optional("shipping_street_2", Text),
        optional("shipping_city", Text),
        optional("shipping_state", Text),
        optional("shipping_zip_code", Text),
        optional("shipping_country", Text),
        required("status", Text),
        optional("cancellation_reason", Text),
        required("item_count", BigInt),
        required("total_cents", BigInt),
        optional("deleted_at", TimestampTz),
        optional("created_at", TimestampTz),
        optional("updated_at", TimestampTz),
        required("event_id", Text),
        required("event_timestamp", TimestampTz),
    ],
    primary_key: &["order_id"],
    foreign_key: None,
    indexes: &[
        IndexDef {
            name: "idx_orders_order_number",
            columns: &["order_number"],
        },
        IndexDef {
            name: "idx_orders_customer_user_id",
            columns: &["customer_user_id"],
        },
    ],
};

pub const ORDER_ITEMS: TableDef = TableDef {
    name: "order_items",
    columns: &[
        required("order_id", Text),
        required("item_id", Text),
        optional("product_id", Text),
        optional("supplier_id", Text),
        optional("product_name", Text),
        optional("variant_name", Text),
        required("variant_attributes", Jsonb),
        optional("image_url", Text),
        optional("supplier_name", Text),
        required("quantity", BigInt),
        required("unit_price_cents", BigInt),
        required("final_price_cents", BigInt),
        required("total_cents", BigInt),
        required("fulfillment_status", Text),
        required("shipped_quantity", BigInt),
        optional("tracking_number", Text),
        optional("carrier", Text),
        optional("shipped_at", TimestampTz),
        optional("delivered_at", TimestampTz),
    ],
    primary_key: &["order_id", "item_id"],
    foreign_key: Some(ForeignKey {
        columns: &["order_id"],
        parent_table: "orders",
        parent_columns: &["order_id"],
    }),
    indexes: &[],
};

pub const POSTS: TableDef = TableDef {
    name: "posts",
    columns: &[
        required("post_id", Text),
        optional("post_type", Text),
        optional("author_user_id", Text),
        optional("author_display_name", Text),
        optional("author_avatar", Text),
        optional("author_type", Text),
        optional("text_content", Text),
        required("media", Jsonb),
        optional("link_url", Text),
        optional("link_title", Text),
        optional("link_description", Text),
        optional("link_image", Text),
        optional("link_site_name", Text),
        required("view_count", BigInt),
        required("like_count", BigInt),
        required("comment_count", BigInt),
        required("share_count", BigInt),
        required("save_count", BigInt),
        required("engagement_rate", Double),
        optional("last_comment_at", TimestampTz),
        optional("published_at", TimestampTz),
        optional("deleted_at", TimestampTz),
        optional("created_at", TimestampTz),
        optional("updated_at", TimestampTz),
        required("event_id", Text),
        required("event_timestamp", TimestampTz),
    ],
    primary_key: &["post_id"],
    foreign_key: None,
    indexes: &[IndexDef {
        name: "idx_posts_author_user_id",
        columns: &["author_user_id"],
    }],
};

/// Every projection table, parents before children.
pub const TABLES: [TableDef; 7] = [
    USERS,
    SUPPLIERS,
    PRODUCTS,
    PRODUCT_VARIANTS,
    ORDERS,
    ORDER_ITEMS,
    POSTS,
];

/// Creates any missing table or index. Safe to run on every start-up.
#[tracing::instrument(skip(db))]
pub async fn ensure_schema(db: &Database) -> Result<()> {
    for table in &TABLES {
        let schema_err = |source| StoreError::Schema {
            table: table.name,
            source,
        };

        sqlx::query(&table.create_table_sql())
            .execute(db.pool())
            .await
            .map_err(schema_err)?;

        for statement in table.create_index_sql() {
            sqlx::query(&statement)
                .execute(db.pool())
                .await
                .map_err(schema_err)?;
        }

        tracing::info!(table = table.name, "table ready");
    }

    Ok(())
}
