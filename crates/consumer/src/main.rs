//! Consumer entry point.

use std::sync::Arc;

use analytics_store::{Database, PostgresAnalyticsStore, ensure_schema};
use consumer::{Config, EventConsumer, KafkaEventLog, ops_router, projection_dispatcher, telemetry};

#[tokio::main]
async fn main() -> consumer::Result<()> {
    // 1. Load configuration and initialize observability
    let config = Config::from_env()?;
    telemetry::init_tracing(&config);
    let metrics_handle = telemetry::install_metrics_recorder()?;

    // 2. Open the pool and make sure every table exists
    let db = Database::connect(&config.database).await?;
    ensure_schema(&db).await?;
    let store = Arc::new(PostgresAnalyticsStore::new(db.clone()));

    // 3. Build the consumer and subscribe to every topic
    let log = KafkaEventLog::new(&config.kafka)?;
    let mut consumer = EventConsumer::new(log, projection_dispatcher(store), config.poll_timeout);
    consumer.subscribe(None)?;

    // 4. Serve health and metrics until the loop stops
    let addr = config.ops_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "starting ops server");

    let stop = consumer.stop_handle();
    let app = ops_router(metrics_handle, consumer.consuming_flag());
    let ops = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { stop.stopped().await })
            .await
    });

    // 5. Consume until SIGINT/SIGTERM
    let result = consumer.start().await;

    consumer.stop();
    match ops.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::error!(error = %err, "ops server failed"),
        Err(err) => tracing::error!(error = %err, "ops server task panicked"),
    }
    db.close().await;

    let stats = result?;
    tracing::info!(?stats, "shut down gracefully");
    Ok(())
}
