//! Kafka consumer for the analytics projection.
//!
//! Polls the domain topics, decodes each envelope and hands it to the
//! projector registered for its event type. A small ops router exposes
//! health and Prometheus metrics while the loop runs.

pub mod config;
pub mod consumer;
pub mod dispatcher;
pub mod error;
pub mod kafka;
pub mod log;
pub mod memory;
pub mod routes;
pub mod signal;
pub mod telemetry;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use analytics_store::AnalyticsStore;
use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use projections::all_handlers;
use tower_http::trace::TraceLayer;

pub use config::{Config, KafkaConfig, LogFormat};
pub use consumer::{ConsumerStats, EventConsumer, StopHandle};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{ConsumerError, Result};
pub use kafka::KafkaEventLog;
pub use log::{EventLog, LogMessage};
pub use memory::InMemoryEventLog;

/// Creates a dispatcher with every projector registered against `store`.
pub fn projection_dispatcher<S>(store: S) -> Dispatcher
where
    S: AnalyticsStore + Clone + 'static,
{
    let mut dispatcher = Dispatcher::new();
    dispatcher.register_all(all_handlers(store));
    dispatcher
}

/// Creates the ops router serving `/health` and `/metrics`.
pub fn ops_router(metrics_handle: PrometheusHandle, consuming: Arc<AtomicBool>) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .with_state(consuming)
        .merge(metrics_router)
        .layer(TraceLayer::new_for_http())
}
