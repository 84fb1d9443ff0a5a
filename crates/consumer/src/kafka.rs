//! Kafka-backed event log.

use std::time::Duration;

use async_trait::async_trait;
use common::Topic;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use rdkafka::types::RDKafkaErrorCode;

use crate::Result;
use crate::config::KafkaConfig;
use crate::log::{EventLog, LogMessage};

/// Builds the librdkafka client settings for the consumer group.
///
/// Offsets are committed in the background, but only positions explicitly
/// stored through [`EventLog::mark_handled`] are eligible.
pub fn client_config(config: &KafkaConfig) -> ClientConfig {
    let mut client = ClientConfig::new();
    client
        .set("bootstrap.servers", &config.bootstrap_servers)
        .set("group.id", &config.group_id)
        .set("auto.offset.reset", &config.auto_offset_reset)
        .set("enable.auto.commit", "true")
        .set(
            "auto.commit.interval.ms",
            config.auto_commit_interval_ms.to_string(),
        )
        .set("enable.auto.offset.store", "false")
        .set("session.timeout.ms", config.session_timeout_ms.to_string())
        .set("enable.partition.eof", "false");

    if let Some(client_id) = &config.client_id {
        client.set("client.id", client_id);
    }
    client
}

/// Event log reading from a Kafka consumer group.
pub struct KafkaEventLog {
    consumer: StreamConsumer,
}

impl KafkaEventLog {
    /// Creates the consumer. No connection is made until [`EventLog::subscribe`].
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        let consumer: StreamConsumer = client_config(config).create()?;

        tracing::info!(
            brokers = %config.bootstrap_servers,
            group_id = %config.group_id,
            "kafka consumer created"
        );

        Ok(Self { consumer })
    }
}

#[async_trait]
impl EventLog for KafkaEventLog {
    fn subscribe(&self, topics: &[Topic]) -> Result<()> {
        let names: Vec<&str> = topics.iter().map(Topic::as_str).collect();
        self.consumer.subscribe(&names)?;
        tracing::info!(topics = ?names, "subscribed to topics");
        Ok(())
    }

    async fn poll(&self, timeout: Duration) -> Option<Result<LogMessage>> {
        let received = tokio::time::timeout(timeout, self.consumer.recv())
            .await
            .ok()?;

        Some(
            received
                .map(|message| LogMessage {
                    topic: message.topic().to_string(),
                    partition: message.partition(),
                    offset: message.offset(),
                    payload: message.payload().map(<[u8]>::to_vec),
                })
                .map_err(Into::into),
        )
    }

    fn mark_handled(&self, message: &LogMessage) -> Result<()> {
        // The stored position is the next offset to read.
        self.consumer
            .store_offset(&message.topic, message.partition, message.offset + 1)?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        match self.consumer.commit_consumer_state(CommitMode::Sync) {
            Ok(()) => tracing::info!("final offsets committed"),
            Err(KafkaError::ConsumerCommit(RDKafkaErrorCode::NoOffset)) => {
                tracing::debug!("no new offsets to commit");
            }
            Err(err) => return Err(err.into()),
        }
        self.consumer.unsubscribe();
        Ok(())
    }
}
