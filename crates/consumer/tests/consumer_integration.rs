//! Poll loop tests against the in-memory event log and store.

use std::sync::Arc;
use std::time::Duration;

use analytics_store::{AnalyticsStore, InMemoryAnalyticsStore};
use async_trait::async_trait;
use common::{EventType, Topic};
use consumer::{ConsumerStats, EventConsumer, InMemoryEventLog, projection_dispatcher};
use domain::DomainEvent;
use projections::{EventHandler, ProjectionError};
use serde_json::{Value, json};

struct Failing;

#[async_trait]
impl EventHandler for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn handle(&self, event: &DomainEvent) -> projections::Result<()> {
        Err(ProjectionError::UnexpectedEvent {
            projector: "failing",
            event_type: event.event_type(),
        })
    }
}

fn event(event_id: &str, event_type: &str, entity_id: &str, data: Value) -> Value {
    json!({
        "event_id": event_id,
        "event_type": event_type,
        "entity_id": entity_id,
        "timestamp": "2024-03-01T10:00:00Z",
        "data": data
    })
}

fn projection_consumer(
    log: &InMemoryEventLog,
    store: &InMemoryAnalyticsStore,
) -> EventConsumer<InMemoryEventLog> {
    EventConsumer::new(
        log.clone(),
        projection_dispatcher(store.clone()),
        Duration::from_millis(20),
    )
    .without_signal_handling()
}

/// Runs the loop until `expected` messages are handled, then stops it.
async fn consume(
    log: &InMemoryEventLog,
    store: &InMemoryAnalyticsStore,
    expected: usize,
) -> ConsumerStats {
    run(projection_consumer(log, store), log, expected).await
}

async fn run(
    mut consumer: EventConsumer<InMemoryEventLog>,
    log: &InMemoryEventLog,
    expected: usize,
) -> ConsumerStats {
    consumer.subscribe(None).unwrap();
    let stop = consumer.stop_handle();

    let running = tokio::spawn(async move { consumer.start().await });

    tokio::time::timeout(Duration::from_secs(5), async {
        while log.handled_count() < expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("messages were not handled in time");

    stop.stop();
    running.await.unwrap().unwrap()
}

#[tokio::test]
async fn test_projects_events_from_every_topic() {
    let log = InMemoryEventLog::new();
    let store = InMemoryAnalyticsStore::new();

    log.publish_json(
        Topic::User,
        &event(
            "e-1",
            "user.created",
            "user-1",
            json!({"contact_info": {"primary_email": "a@example.com"}}),
        ),
    );
    log.publish_json(
        Topic::Supplier,
        &event(
            "e-2",
            "supplier.created",
            "sup-1",
            json!({"company_info": {"legal_name": "Acme"}}),
        ),
    );
    log.publish_json(
        Topic::Product,
        &event(
            "e-3",
            "product.created",
            "prod-1",
            json!({
                "name": "Widget",
                "supplier_id": "sup-1",
                "variants": {
                    "small": {"variant_id": "v-1", "variant_name": "small", "price_cents": 500}
                }
            }),
        ),
    );
    log.publish_json(
        Topic::Order,
        &event(
            "e-4",
            "order.created",
            "order-1",
            json!({
                "order_number": "ORD-1",
                "customer_id": "user-1",
                "items": [
                    {"item_id": "i-1", "quantity": 1, "unit_price_cents": 500, "total_cents": 500}
                ]
            }),
        ),
    );
    log.publish_json(
        Topic::Post,
        &event("e-5", "post.created", "post-1", json!({"text_content": "hello"})),
    );

    let stats = consume(&log, &store, 5).await;

    assert_eq!(stats.polled, 5);
    assert_eq!(stats.applied, 5);
    let user = store.get_user("user-1").await.unwrap().unwrap();
    assert_eq!(user.email.as_deref(), Some("a@example.com"));
    assert!(store.get_supplier("sup-1").await.unwrap().is_some());
    assert_eq!(store.get_product_variants("prod-1").await.unwrap().len(), 1);
    let order = store.get_order("order-1").await.unwrap().unwrap();
    assert_eq!(order.customer_user_id.as_deref(), Some("user-1"));
    assert_eq!(store.get_order_items("order-1").await.unwrap().len(), 1);
    assert!(store.get_post("post-1").await.unwrap().is_some());
    assert!(log.is_closed());
}

#[tokio::test]
async fn test_bad_messages_are_skipped_and_marked_handled() {
    let log = InMemoryEventLog::new();
    let store = InMemoryAnalyticsStore::new();

    log.publish(Topic::User.as_str(), Some(b"{not json".to_vec()));
    log.publish(Topic::User.as_str(), None);
    log.publish_json(Topic::User, &event("e-1", "user.renamed", "user-1", json!({})));
    log.publish_json(
        Topic::Order,
        &event("e-2", "order.created", "order-1", json!({"items": []})),
    );
    log.publish_json(Topic::User, &event("e-3", "user.created", "user-1", json!({})));

    let stats = consume(&log, &store, 5).await;

    assert_eq!(stats.polled, 5);
    assert_eq!(stats.skipped, 4);
    assert_eq!(stats.applied, 1);
    assert_eq!(stats.failed, 0);

    let handled: Vec<(String, i64)> = log
        .handled()
        .into_iter()
        .map(|m| (m.topic, m.offset))
        .collect();
    assert!(handled.contains(&("user".to_string(), 3)));
    assert!(handled.contains(&("order".to_string(), 0)));
    assert!(store.get_user("user-1").await.unwrap().is_some());
    assert!(store.get_order("order-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_redelivered_events_are_idempotent() {
    let log = InMemoryEventLog::new();
    let store = InMemoryAnalyticsStore::new();

    let created = event(
        "e-1",
        "order.created",
        "order-1",
        json!({
            "order_number": "ORD-1",
            "items": [
                {"item_id": "i-1", "quantity": 2, "unit_price_cents": 100, "total_cents": 200},
                {"item_id": "i-2", "quantity": 1, "unit_price_cents": 300, "total_cents": 300}
            ]
        }),
    );
    log.publish_json(Topic::Order, &created);
    log.publish_json(Topic::Order, &created);

    let stats = consume(&log, &store, 2).await;
    assert_eq!(stats.applied, 2);

    let order = store.get_order("order-1").await.unwrap().unwrap();
    assert_eq!(order.item_count, 2);
    assert_eq!(store.get_order_items("order-1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_cancellation_before_creation_is_tolerated() {
    let log = InMemoryEventLog::new();
    let store = InMemoryAnalyticsStore::new();

    log.publish_json(
        Topic::Order,
        &event(
            "e-1",
            "order.cancelled",
            "order-1",
            json!({"order_number": "ORD-1", "reason": "changed mind"}),
        ),
    );
    log.publish_json(
        Topic::Order,
        &event(
            "e-2",
            "order.created",
            "order-1",
            json!({"order_number": "ORD-1", "items": []}),
        ),
    );

    let stats = consume(&log, &store, 2).await;

    assert_eq!(stats.applied, 2);
    let order = store.get_order("order-1").await.unwrap().unwrap();
    assert_ne!(order.status, "cancelled");
}

#[tokio::test]
async fn test_handler_failure_does_not_block_the_next_message() {
    let log = InMemoryEventLog::new();
    let store = InMemoryAnalyticsStore::new();

    let failed_offset =
        log.publish_json(Topic::User, &event("e-1", "user.created", "user-1", json!({})));
    log.publish_json(Topic::Post, &event("e-2", "post.created", "post-1", json!({})));

    let mut consumer = projection_consumer(&log, &store);
    consumer.register_handler(EventType::UserCreated, Arc::new(Failing));
    let stats = run(consumer, &log, 2).await;

    assert_eq!(stats.polled, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.applied, 1);
    assert!(
        log.handled()
            .iter()
            .any(|m| m.topic == "user" && m.offset == failed_offset)
    );
    assert!(store.get_user("user-1").await.unwrap().is_none());
    assert!(store.get_post("post-1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_unknown_order_event_changes_nothing() {
    let log = InMemoryEventLog::new();
    let store = InMemoryAnalyticsStore::new();

    log.publish_json(
        Topic::Order,
        &event(
            "e-1",
            "order.created",
            "order-1",
            json!({
                "order_number": "ORD-1",
                "status": "paid",
                "items": [{"item_id": "i-1", "quantity": 1, "total_cents": 500}]
            }),
        ),
    );
    let stats = consume(&log, &store, 1).await;
    assert_eq!(stats.applied, 1);
    let counts = store.row_counts().await;

    log.publish_json(
        Topic::Order,
        &event(
            "e-2",
            "order.refunded",
            "order-1",
            json!({"order_number": "ORD-1", "status": "refunded"}),
        ),
    );
    let stats = consume(&log, &store, 2).await;

    assert_eq!(stats.polled, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.applied, 0);
    assert_eq!(store.row_counts().await, counts);
    let order = store.get_order("order-1").await.unwrap().unwrap();
    assert_eq!(order.status, "paid");
    assert_eq!(order.event_id, "e-1");
}

#[tokio::test]
async fn test_only_subscribed_topics_are_consumed() {
    let log = InMemoryEventLog::new();
    let store = InMemoryAnalyticsStore::new();

    log.publish_json(Topic::Post, &event("e-1", "post.created", "post-1", json!({})));
    log.publish_json(Topic::User, &event("e-2", "user.created", "user-1", json!({})));

    let mut consumer = projection_consumer(&log, &store);
    consumer.subscribe(Some(&[Topic::User])).unwrap();
    let stop = consumer.stop_handle();
    let running = tokio::spawn(async move { consumer.start().await });

    tokio::time::timeout(Duration::from_secs(5), async {
        while log.handled_count() < 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    stop.stop();
    let stats = running.await.unwrap().unwrap();

    assert_eq!(stats.polled, 1);
    assert!(store.get_user("user-1").await.unwrap().is_some());
    assert!(store.get_post("post-1").await.unwrap().is_none());
}
