//! Integration tests: envelopes → DomainEvent → projector handlers → in-memory store.

use analytics_store::{AnalyticsStore, InMemoryAnalyticsStore};
use chrono::{TimeZone, Utc};
use common::EventType;
use domain::{DomainEvent, EventEnvelope};
use projections::{EventHandler, HandlerMap, ProjectionError, UserProjector, all_handlers};
use serde_json::{Value, json};

/// Helper to set up a store and the full handler map.
fn setup() -> (InMemoryAnalyticsStore, HandlerMap) {
    let store = InMemoryAnalyticsStore::new();
    let handlers = all_handlers(store.clone());
    (store, handlers)
}

fn event(
    event_id: &str,
    event_type: &str,
    entity_id: &str,
    timestamp: &str,
    data: Value,
) -> DomainEvent {
    let bytes = serde_json::to_vec(&json!({
        "event_id": event_id,
        "event_type": event_type,
        "entity_id": entity_id,
        "timestamp": timestamp,
        "data": data,
    }))
    .unwrap();
    let envelope = EventEnvelope::from_slice(&bytes).unwrap();
    DomainEvent::decode(&envelope).unwrap()
}

async fn apply(handlers: &HandlerMap, event: &DomainEvent) {
    handlers[&event.event_type()].handle(event).await.unwrap();
}

fn user_created(event_id: &str, created_at: &str) -> DomainEvent {
    event(
        event_id,
        "user.created",
        "u-1",
        "2024-05-01T10:00:00Z",
        json!({
            "contact_info": {"primary_email": "ada@example.com"},
            "profile": {"display_name": "Ada"},
            "created_at": created_at,
        }),
    )
}

fn product_snapshot(event_type: &str, event_id: &str, variant_keys: &[&str]) -> DomainEvent {
    let variants: serde_json::Map<String, Value> = variant_keys
        .iter()
        .map(|key| {
            (
                key.to_string(),
                json!({
                    "variant_id": format!("v-{key}"),
                    "variant_name": key,
                    "attributes": [{"attribute_name": "color", "attribute_value": key}],
                    "price_cents": 900,
                    "quantity": 5
                }),
            )
        })
        .collect();

    event(
        event_id,
        event_type,
        "p-1",
        "2024-05-01T10:00:00Z",
        json!({
            "supplier_id": "s-1",
            "name": "Mug",
            "base_price_cents": 900,
            "variants": variants,
        }),
    )
}

fn order_created(items: Value) -> DomainEvent {
    event(
        "e-order",
        "order.created",
        "o-1",
        "2024-05-01T10:00:00Z",
        json!({
            "order_number": "ORD-1",
            "customer_id": "u-1",
            "customer_display_name": "Ada",
            "shipping_address": {"city": "Porto", "country": "PT"},
            "items": items,
        }),
    )
}

mod idempotence {
    use super::*;

    #[tokio::test]
    async fn replaying_a_creation_leaves_one_identical_row() {
        let (store, handlers) = setup();
        let created = user_created("e-1", "2024-05-01T09:00:00Z");

        apply(&handlers, &created).await;
        let first = store.get_user("u-1").await.unwrap().unwrap();

        apply(&handlers, &created).await;
        let second = store.get_user("u-1").await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(store.row_counts().await["users"], 1);
    }

    #[tokio::test]
    async fn replaying_an_order_does_not_duplicate_items() {
        let (store, handlers) = setup();
        let created = order_created(json!([
            {"item_id": "i-1", "quantity": 1, "total_cents": 100},
            {"item_id": "i-2", "quantity": 1, "total_cents": 200}
        ]));

        apply(&handlers, &created).await;
        apply(&handlers, &created).await;

        assert_eq!(store.get_order_items("o-1").await.unwrap().len(), 2);
        assert_eq!(store.get_order("o-1").await.unwrap().unwrap().total_cents, 300);
    }

    #[tokio::test]
    async fn created_at_is_write_once() {
        let (store, handlers) = setup();
        apply(&handlers, &user_created("e-1", "2024-05-01T09:00:00Z")).await;
        apply(&handlers, &user_created("e-2", "2024-06-01T09:00:00Z")).await;

        let row = store.get_user("u-1").await.unwrap().unwrap();
        assert_eq!(
            row.created_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(row.event_id, "e-2");
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn user_deletion_is_soft() {
        let (store, handlers) = setup();
        apply(&handlers, &user_created("e-1", "2024-05-01T09:00:00Z")).await;
        apply(
            &handlers,
            &event(
                "e-2",
                "user.deleted",
                "u-1",
                "2024-05-02T00:00:00Z",
                json!({"deleted_at": "2024-05-01T23:59:00Z"}),
            ),
        )
        .await;

        let row = store.get_user("u-1").await.unwrap().unwrap();
        assert_eq!(
            row.deleted_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap())
        );
        assert_eq!(row.event_id, "e-2");
    }

    #[tokio::test]
    async fn post_deletion_without_timestamp_uses_event_time() {
        let (store, handlers) = setup();
        apply(
            &handlers,
            &event(
                "e-1",
                "post.created",
                "post-1",
                "2024-05-01T00:00:00Z",
                json!({"text_content": "hi"}),
            ),
        )
        .await;
        apply(
            &handlers,
            &event("e-2", "post.deleted", "post-1", "2024-05-03T08:00:00Z", Value::Null),
        )
        .await;

        let row = store.get_post("post-1").await.unwrap().unwrap();
        assert_eq!(
            row.deleted_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 3, 8, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn supplier_deletion_is_hard() {
        let (store, handlers) = setup();
        apply(
            &handlers,
            &event(
                "e-1",
                "supplier.created",
                "s-1",
                "2024-05-01T00:00:00Z",
                json!({"company_info": {"legal_name": "Acme"}}),
            ),
        )
        .await;
        assert!(store.get_supplier("s-1").await.unwrap().is_some());

        apply(
            &handlers,
            &event("e-2", "supplier.deleted", "s-1", "2024-05-02T00:00:00Z", json!({})),
        )
        .await;
        assert!(store.get_supplier("s-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn product_deletion_removes_variants() {
        let (store, handlers) = setup();
        apply(&handlers, &product_snapshot("product.created", "e-1", &["red", "blue"])).await;
        apply(
            &handlers,
            &event("e-2", "product.deleted", "p-1", "2024-05-02T00:00:00Z", json!({})),
        )
        .await;

        assert!(store.get_product("p-1").await.unwrap().is_none());
        assert!(store.get_product_variants("p-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_an_unknown_entity_is_a_no_op() {
        let (store, handlers) = setup();
        apply(
            &handlers,
            &event("e-1", "user.deleted", "ghost", "2024-05-02T00:00:00Z", json!({})),
        )
        .await;
        assert!(store.get_user("ghost").await.unwrap().is_none());
    }
}

mod child_replacement {
    use super::*;

    #[tokio::test]
    async fn published_snapshot_replaces_variants() {
        let (store, handlers) = setup();
        apply(&handlers, &product_snapshot("product.created", "e-1", &["red", "blue"])).await;
        apply(&handlers, &product_snapshot("product.published", "e-2", &["green"])).await;

        let variants = store.get_product_variants("p-1").await.unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].variant_key, "green");
        assert_eq!(
            variants[0].attributes,
            json!([{"attribute_name": "color", "attribute_value": "green"}])
        );

        let product = store.get_product("p-1").await.unwrap().unwrap();
        assert_eq!(product.variant_count, 1);
        assert_eq!(product.event_id, "e-2");
    }

    #[tokio::test]
    async fn order_snapshot_replaces_items() {
        let (store, handlers) = setup();
        apply(&handlers, &order_created(json!([{"item_id": "i-1"}, {"item_id": "i-2"}]))).await;
        apply(&handlers, &order_created(json!([{"item_id": "i-3"}]))).await;

        let items = store.get_order_items("o-1").await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, vec!["i-3"]);
    }

    #[tokio::test]
    async fn overlapping_variant_keys_keep_the_new_set() {
        let (store, handlers) = setup();
        apply(&handlers, &product_snapshot("product.created", "e-1", &["red", "blue"])).await;
        apply(&handlers, &product_snapshot("product.published", "e-2", &["red", "green"])).await;

        let variants = store.get_product_variants("p-1").await.unwrap();
        let mut keys: Vec<_> = variants.iter().map(|v| v.variant_key.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["green", "red"]);
        assert_eq!(store.get_product("p-1").await.unwrap().unwrap().variant_count, 2);
    }

    #[tokio::test]
    async fn overlapping_item_ids_keep_the_new_set() {
        let (store, handlers) = setup();
        apply(
            &handlers,
            &order_created(json!([
                {"item_id": "i-1", "quantity": 1},
                {"item_id": "i-2", "quantity": 1}
            ])),
        )
        .await;
        apply(
            &handlers,
            &order_created(json!([
                {"item_id": "i-1", "quantity": 4},
                {"item_id": "i-3", "quantity": 1}
            ])),
        )
        .await;

        let items = store.get_order_items("o-1").await.unwrap();
        let mut ids: Vec<_> = items.iter().map(|i| i.item_id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["i-1", "i-3"]);
        let kept = items.iter().find(|i| i.item_id == "i-1").unwrap();
        assert_eq!(kept.quantity, 4);
    }

    #[tokio::test]
    async fn repeated_item_id_in_one_order_keeps_the_last() {
        let (store, handlers) = setup();
        apply(
            &handlers,
            &order_created(json!([
                {"item_id": "i-1", "quantity": 1, "total_cents": 100},
                {"item_id": "i-1", "quantity": 2, "total_cents": 200}
            ])),
        )
        .await;

        let items = store.get_order_items("o-1").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].total_cents, 200);
        assert!(store.get_order("o-1").await.unwrap().is_some());
    }
}

mod order_items {
    use super::*;

    #[tokio::test]
    async fn items_are_flattened_with_their_product_snapshot() {
        let (store, handlers) = setup();
        apply(
            &handlers,
            &order_created(json!([{
                "item_id": "i-1",
                "product_snapshot": {
                    "product_id": "p-1",
                    "supplier_id": "s-1",
                    "product_name": "Mug",
                    "variant_name": "White",
                    "variant_attributes": {"color": "white"},
                    "image_url": "https://cdn/mug.png",
                    "supplier_name": "Acme"
                },
                "quantity": 2,
                "unit_price_cents": 900,
                "final_price_cents": 800,
                "total_cents": 1600,
                "fulfillment_status": "shipped",
                "shipped_quantity": 2,
                "carrier": "UPS",
                "shipped_at": "2024-05-02T00:00:00Z"
            }])),
        )
        .await;

        let items = store.get_order_items("o-1").await.unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.order_id, "o-1");
        assert_eq!(item.product_name.as_deref(), Some("Mug"));
        assert_eq!(item.supplier_name.as_deref(), Some("Acme"));
        assert_eq!(item.variant_attributes, json!({"color": "white"}));
        assert_eq!(item.final_price_cents, 800);
        assert_eq!(item.fulfillment_status, "shipped");
        assert_eq!(item.carrier.as_deref(), Some("UPS"));
        assert!(item.shipped_at.is_some());

        let order = store.get_order("o-1").await.unwrap().unwrap();
        assert_eq!(order.order_number, "ORD-1");
        assert_eq!(order.status, "pending");
        assert_eq!(order.shipping_city.as_deref(), Some("Porto"));
    }
}

mod cancellation {
    use super::*;

    fn cancelled(event_id: &str, timestamp: &str) -> DomainEvent {
        event(
            event_id,
            "order.cancelled",
            "o-1",
            timestamp,
            json!({"order_number": "ORD-1", "reason": "customer request"}),
        )
    }

    #[tokio::test]
    async fn cancellation_updates_status_only() {
        let (store, handlers) = setup();
        apply(&handlers, &order_created(json!([{"item_id": "i-1"}]))).await;
        apply(&handlers, &cancelled("e-cancel", "2024-05-03T00:00:00Z")).await;

        let order = store.get_order("o-1").await.unwrap().unwrap();
        assert_eq!(order.status, "cancelled");
        assert_eq!(order.cancellation_reason.as_deref(), Some("customer request"));
        assert_eq!(order.event_id, "e-cancel");
        assert_eq!(order.customer_user_id.as_deref(), Some("u-1"));
        assert_eq!(store.get_order_items("o-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancellation_before_creation_is_tolerated() {
        let (store, handlers) = setup();
        apply(&handlers, &cancelled("e-cancel", "2024-05-01T09:00:00Z")).await;
        assert!(store.get_order("o-1").await.unwrap().is_none());

        // The creation arriving late wins; the earlier cancellation is not replayed.
        apply(&handlers, &order_created(json!([]))).await;
        let order = store.get_order("o-1").await.unwrap().unwrap();
        assert_eq!(order.status, "pending");
    }
}

mod routing {
    use super::*;

    #[tokio::test]
    async fn projector_rejects_foreign_event_types() {
        let projector = UserProjector::new(InMemoryAnalyticsStore::new());
        let foreign = event("e-1", "post.deleted", "post-1", "2024-05-01T00:00:00Z", json!({}));

        let err = projector.handle(&foreign).await.unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::UnexpectedEvent {
                projector: "UserProjector",
                event_type: EventType::PostDeleted,
            }
        ));
    }

    #[test]
    fn handler_map_covers_the_registry() {
        let (_, handlers) = setup();
        for event_type in EventType::ALL {
            assert!(handlers.contains_key(&event_type), "{event_type} unhandled");
        }
    }
}

mod timestamps {
    use super::*;

    #[tokio::test]
    async fn zulu_and_explicit_utc_offset_project_identically() {
        let (zulu_store, zulu_handlers) = setup();
        let (offset_store, offset_handlers) = setup();

        let data = |ts: &str| json!({"created_at": ts, "updated_at": ts, "published_at": ts});

        apply(
            &zulu_handlers,
            &event(
                "e-1",
                "post.published",
                "post-1",
                "2024-05-01T10:00:00Z",
                data("2024-05-01T10:00:00.250Z"),
            ),
        )
        .await;
        apply(
            &offset_handlers,
            &event(
                "e-1",
                "post.published",
                "post-1",
                "2024-05-01T10:00:00+00:00",
                data("2024-05-01T10:00:00.250+00:00"),
            ),
        )
        .await;

        let zulu = zulu_store.get_post("post-1").await.unwrap().unwrap();
        let offset = offset_store.get_post("post-1").await.unwrap().unwrap();
        assert_eq!(zulu, offset);
        assert_eq!(zulu.published_at.unwrap().timestamp_subsec_millis(), 250);
    }

    #[tokio::test]
    async fn naive_timestamps_are_read_as_utc() {
        let (store, handlers) = setup();
        apply(&handlers, &user_created("e-1", "2024-05-01T09:00:00")).await;

        let row = store.get_user("u-1").await.unwrap().unwrap();
        assert_eq!(
            row.created_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
        );
    }
}
