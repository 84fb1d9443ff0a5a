use analytics_store::InMemoryAnalyticsStore;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{DomainEvent, EventEnvelope};
use projections::{EventHandler, all_handlers};
use serde_json::json;

fn order_event(order_index: usize, items: usize) -> DomainEvent {
    let items: Vec<_> = (0..items)
        .map(|i| {
            json!({
                "item_id": format!("item-{i}"),
                "product_snapshot": {
                    "product_id": format!("prod-{i}"),
                    "product_name": "Widget",
                    "variant_attributes": {"size": "M"}
                },
                "quantity": 2,
                "unit_price_cents": 1000,
                "final_price_cents": 1000,
                "total_cents": 2000
            })
        })
        .collect();

    let envelope = EventEnvelope::builder()
        .event_type("order.created")
        .entity_id(format!("order-{order_index}"))
        .data(json!({"order_number": format!("ORD-{order_index}"), "items": items}))
        .build();
    DomainEvent::decode(&envelope).unwrap()
}

fn product_event(variants: usize) -> DomainEvent {
    let variants: serde_json::Map<_, _> = (0..variants)
        .map(|i| {
            (
                format!("variant-{i}"),
                json!({
                    "variant_id": format!("v-{i}"),
                    "variant_name": format!("variant-{i}"),
                    "price_cents": 100
                }),
            )
        })
        .collect();

    let envelope = EventEnvelope::builder()
        .event_type("product.published")
        .entity_id("product-bench")
        .data(json!({"name": "Widget", "variants": variants}))
        .build();
    DomainEvent::decode(&envelope).unwrap()
}

fn bench_project_100_orders(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let events: Vec<_> = (0..100).map(|i| order_event(i, 3)).collect();

    c.bench_function("projections/100_orders", |b| {
        b.iter(|| {
            rt.block_on(async {
                let handlers = all_handlers(InMemoryAnalyticsStore::new());
                for event in &events {
                    handlers[&event.event_type()].handle(event).await.unwrap();
                }
            });
        });
    });
}

fn bench_replay_product_snapshot(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let handlers = all_handlers(InMemoryAnalyticsStore::new());
    let event = product_event(20);

    c.bench_function("projections/replay_product_20_variants", |b| {
        b.iter(|| {
            rt.block_on(async {
                handlers[&event.event_type()].handle(&event).await.unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_project_100_orders, bench_replay_product_snapshot);
criterion_main!(benches);
