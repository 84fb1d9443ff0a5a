//! Consumer error types.

use thiserror::Error;

/// Errors that stop the consumer process or fail one of its start-up steps.
///
/// Per-message failures never surface here; the dispatcher logs them and
/// reports a [`crate::DispatchOutcome`] instead.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// Required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The Kafka client failed.
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// The analytics store failed during start-up.
    #[error("Store error: {0}")]
    Store(#[from] analytics_store::StoreError),

    /// The Prometheus recorder could not be installed.
    #[error("Metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// An I/O error occurred, e.g. binding the ops listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for consumer operations.
pub type Result<T> = std::result::Result<T, ConsumerError>;
