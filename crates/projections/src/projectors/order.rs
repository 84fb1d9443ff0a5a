use std::collections::HashMap;

use analytics_store::{AnalyticsStore, EventStamp, OrderItemRow, OrderRow};
use async_trait::async_trait;
use common::EventType;
use domain::{DomainEvent, EventPayload, OrderItem, OrderPayload};
use serde_json::Value;

use crate::Result;
use crate::projector::{EventHandler, Projector, record_affected, record_applied, stamp};

const DEFAULT_STATUS: &str = "pending";

/// Maps an `order.created` header to its row.
pub fn order_row(order_id: &str, payload: &OrderPayload, stamp: EventStamp) -> OrderRow {
    let address = &payload.shipping_address;

    OrderRow {
        order_id: order_id.to_string(),
        order_number: payload.order_number.clone(),
        customer_user_id: payload.customer_id.clone(),
        customer_display_name: payload.customer_display_name.clone(),
        customer_email: payload.customer_email.clone(),
        customer_phone: payload.customer_phone.clone(),
        recipient_name: address.recipient_name.clone(),
        shipping_phone: address.phone.clone(),
        shipping_street_1: address.street_1.clone(),
        shipping_street_2: address.street_2.clone(),
        shipping_city: address.city.clone(),
        shipping_state: address.state.clone(),
        shipping_zip_code: address.zip_code.clone(),
        shipping_country: address.country.clone(),
        status: payload
            .status
            .clone()
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        cancellation_reason: None,
        item_count: payload.items.len() as i64,
        total_cents: payload.total_cents(),
        deleted_at: None,
        created_at: payload.created_at,
        updated_at: payload.updated_at,
        event_id: stamp.event_id,
        event_timestamp: stamp.event_timestamp,
    }
}

/// Flattens an item and its product snapshot into one row.
pub fn order_item_row(order_id: &str, item: &OrderItem) -> OrderItemRow {
    let snapshot = &item.product_snapshot;
    let attributes = snapshot
        .variant_attributes
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect();

    OrderItemRow {
        order_id: order_id.to_string(),
        item_id: item.item_id.clone(),
        product_id: snapshot.product_id.clone(),
        supplier_id: snapshot.supplier_id.clone(),
        product_name: snapshot.product_name.clone(),
        variant_name: snapshot.variant_name.clone(),
        variant_attributes: Value::Object(attributes),
        image_url: snapshot.image_url.clone(),
        supplier_name: snapshot.supplier_name.clone(),
        quantity: item.quantity,
        unit_price_cents: item.unit_price_cents,
        final_price_cents: item.final_price_cents,
        total_cents: item.total_cents,
        fulfillment_status: item
            .fulfillment_status
            .clone()
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        shipped_quantity: item.shipped_quantity,
        tracking_number: item.tracking_number.clone(),
        carrier: item.carrier.clone(),
        shipped_at: item.shipped_at,
        delivered_at: item.delivered_at,
    }
}

/// Maps every distinct `item_id` to one row.
///
/// `order_items` is keyed by `(order_id, item_id)`, so a repeated id keeps
/// the position of its first occurrence and the contents of its last.
pub fn order_item_rows(order_id: &str, items: &[OrderItem]) -> Vec<OrderItemRow> {
    let mut rows: Vec<OrderItemRow> = Vec::with_capacity(items.len());
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(items.len());

    for item in items {
        let row = order_item_row(order_id, item);
        match positions.get(item.item_id.as_str()) {
            Some(&index) => rows[index] = row,
            None => {
                positions.insert(item.item_id.as_str(), rows.len());
                rows.push(row);
            }
        }
    }
    rows
}

/// Projects `order.*` events into `orders` and `order_items`.
///
/// Cancellation is keyed by order number and only touches the status; a
/// cancellation for an order that has not been projected yet is a no-op.
pub struct OrderProjector<S> {
    store: S,
}

impl<S: AnalyticsStore> OrderProjector<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn on_created(&self, event: &DomainEvent, payload: &OrderPayload) -> Result<()> {
        let order_id = event.entity_id.as_str();
        let order = order_row(order_id, payload, stamp(event));
        let items = order_item_rows(order_id, &payload.items);

        self.store.upsert_order(&order, &items).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: AnalyticsStore + 'static> EventHandler for OrderProjector<S> {
    fn name(&self) -> &'static str {
        "OrderProjector"
    }

    #[tracing::instrument(
        skip(self, event),
        fields(event_id = %event.event_id, entity_id = %event.entity_id)
    )]
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match &event.payload {
            EventPayload::OrderCreated(payload) => self.on_created(event, payload).await?,
            EventPayload::OrderCancelled(payload) => {
                let affected = self
                    .store
                    .cancel_order(&payload.order_number, payload.reason.as_deref(), &stamp(event))
                    .await?;
                record_affected("order", event, affected);
            }
            _ => return Err(self.unexpected(event)),
        }
        record_applied("order", event);
        Ok(())
    }
}

impl<S: AnalyticsStore + 'static> Projector for OrderProjector<S> {
    const EVENT_TYPES: &'static [EventType] = &[EventType::OrderCreated, EventType::OrderCancelled];
}
