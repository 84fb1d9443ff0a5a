use analytics_store::{AnalyticsStore, EventStamp, ProductRow, ProductVariantRow};
use async_trait::async_trait;
use common::EventType;
use domain::{DomainEvent, EventPayload, ProductPayload, ProductVariant};
use serde_json::{Value, json};

use crate::Result;
use crate::projector::{EventHandler, Projector, record_affected, record_applied, stamp};

/// Maps a product snapshot to its row.
pub fn product_row(product_id: &str, payload: &ProductPayload, stamp: EventStamp) -> ProductRow {
    ProductRow {
        product_id: product_id.to_string(),
        supplier_id: payload.supplier_id.clone(),
        supplier_name: payload.supplier_info.name.clone(),
        name: payload.name.clone(),
        short_description: payload.short_description.clone(),
        category: payload.category.clone(),
        unit_type: payload.unit_type.clone(),
        base_sku: payload.metadata.base_sku.clone(),
        brand: payload.metadata.brand.clone(),
        base_price_cents: payload.base_price_cents,
        status: payload.status.clone(),
        variant_count: payload.variants.len() as i64,
        view_count: payload.stats.view_count,
        favorite_count: payload.stats.favorite_count,
        purchase_count: payload.stats.purchase_count,
        total_reviews: payload.stats.total_reviews,
        published_at: payload.published_at,
        deleted_at: None,
        created_at: payload.created_at,
        updated_at: payload.updated_at,
        event_id: stamp.event_id,
        event_timestamp: stamp.event_timestamp,
    }
}

/// Maps one entry of the `variants` mapping to its row.
///
/// Attributes are kept as the ordered list the source sent, repeated names
/// included.
pub fn variant_row(
    product_id: &str,
    variant_key: &str,
    variant: &ProductVariant,
) -> ProductVariantRow {
    let attributes = variant
        .attributes
        .iter()
        .map(|attr| {
            json!({
                "attribute_name": attr.attribute_name,
                "attribute_value": attr.attribute_value,
            })
        })
        .collect();
    let dimensions = variant.package_dimensions;

    ProductVariantRow {
        product_id: product_id.to_string(),
        variant_key: variant_key.to_string(),
        variant_id: variant.variant_id.clone(),
        variant_name: variant.variant_name.clone(),
        attributes: Value::Array(attributes),
        price_cents: variant.price_cents,
        cost_cents: variant.cost_cents,
        quantity: variant.quantity,
        width_cm: dimensions.map(|d| d.width_cm),
        height_cm: dimensions.map(|d| d.height_cm),
        depth_cm: dimensions.map(|d| d.depth_cm),
        image_url: variant.image_url.clone(),
    }
}

/// Projects `product.*` events into `products` and `product_variants`.
///
/// `product.created` and `product.published` both carry a full snapshot and
/// are handled identically. Deletion is hard and removes the variants.
pub struct ProductProjector<S> {
    store: S,
}

impl<S: AnalyticsStore> ProductProjector<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn on_snapshot(&self, event: &DomainEvent, payload: &ProductPayload) -> Result<()> {
        let product_id = event.entity_id.as_str();
        let product = product_row(product_id, payload, stamp(event));
        let variants: Vec<_> = payload
            .variants
            .iter()
            .map(|(key, variant)| variant_row(product_id, key, variant))
            .collect();

        self.store.upsert_product(&product, &variants).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: AnalyticsStore + 'static> EventHandler for ProductProjector<S> {
    fn name(&self) -> &'static str {
        "ProductProjector"
    }

    #[tracing::instrument(
        skip(self, event),
        fields(event_id = %event.event_id, entity_id = %event.entity_id)
    )]
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match &event.payload {
            EventPayload::ProductCreated(payload) | EventPayload::ProductPublished(payload) => {
                self.on_snapshot(event, payload).await?
            }
            EventPayload::ProductDeleted(_) => {
                let affected = self.store.delete_product(event.entity_id.as_str()).await?;
                record_affected("product", event, affected);
            }
            _ => return Err(self.unexpected(event)),
        }
        record_applied("product", event);
        Ok(())
    }
}

impl<S: AnalyticsStore + 'static> Projector for ProductProjector<S> {
    const EVENT_TYPES: &'static [EventType] = &[
        EventType::ProductCreated,
        EventType::ProductPublished,
        EventType::ProductDeleted,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn variant_attributes_keep_the_source_list() {
        let variant: ProductVariant = serde_json::from_value(json!({
            "variant_id": "v-1",
            "variant_name": "Red / M",
            "attributes": [
                {"attribute_name": "color", "attribute_value": "red"},
                {"attribute_name": "size", "attribute_value": "M"},
                {"attribute_name": "color", "attribute_value": "navy"}
            ],
            "price_cents": 1500,
            "cost_cents": 700,
            "package_dimensions": {"width_cm": 1.5, "height_cm": 2.0, "depth_cm": 3.0}
        }))
        .unwrap();

        let row = variant_row("p-1", "Red / M", &variant);
        assert_eq!(
            row.attributes,
            json!([
                {"attribute_name": "color", "attribute_value": "red"},
                {"attribute_name": "size", "attribute_value": "M"},
                {"attribute_name": "color", "attribute_value": "navy"}
            ])
        );
        assert_eq!(row.cost_cents, Some(700));
        assert_eq!(row.width_cm, Some(1.5));
        assert_eq!(row.quantity, 0);
    }

    #[test]
    fn product_row_counts_variants() {
        let payload: ProductPayload = serde_json::from_value(json!({
            "supplier_info": {"name": "Acme"},
            "metadata": {"brand": "ACME"},
            "variants": {
                "a": {"variant_id": "1", "variant_name": "a", "price_cents": 1},
                "b": {"variant_id": "2", "variant_name": "b", "price_cents": 2}
            }
        }))
        .unwrap();

        let row = product_row("p-1", &payload, EventStamp::new("e", Utc::now()));
        assert_eq!(row.variant_count, 2);
        assert_eq!(row.supplier_name.as_deref(), Some("Acme"));
        assert_eq!(row.brand.as_deref(), Some("ACME"));
        assert_eq!(row.base_price_cents, 0);
    }
}
