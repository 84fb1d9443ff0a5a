//! Event log abstraction.

use std::time::Duration;

use async_trait::async_trait;
use common::Topic;

use crate::Result;

/// A message read from the log, detached from the client that fetched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// `None` for tombstones.
    pub payload: Option<Vec<u8>>,
}

/// Source of event messages for the consumer loop.
///
/// Delivery is at least once: a message only counts as consumed after
/// [`EventLog::mark_handled`], so anything polled but not marked is
/// redelivered after a restart.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Subscribes to the given topics, replacing any previous subscription.
    fn subscribe(&self, topics: &[Topic]) -> Result<()>;

    /// Waits up to `timeout` for the next message.
    ///
    /// Returns `None` when nothing arrived in time.
    async fn poll(&self, timeout: Duration) -> Option<Result<LogMessage>>;

    /// Records that `message` has been processed, successfully or not.
    fn mark_handled(&self, message: &LogMessage) -> Result<()>;

    /// Flushes consumed positions and leaves the subscription.
    fn close(&self) -> Result<()>;
}
