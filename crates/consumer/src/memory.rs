//! In-memory event log for tests and local runs.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use common::Topic;
use tokio::sync::Notify;

use crate::Result;
use crate::log::{EventLog, LogMessage};

#[derive(Default)]
struct State {
    pending: VecDeque<LogMessage>,
    handled: Vec<LogMessage>,
    subscribed: Vec<Topic>,
    next_offsets: HashMap<String, i64>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    notify: Notify,
    closed: AtomicBool,
}

/// Single-partition log backed by a queue.
///
/// Only messages on subscribed topics are delivered; others wait in the
/// queue until their topic is subscribed.
#[derive(Clone, Default)]
pub struct InMemoryEventLog {
    inner: Arc<Inner>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a message to `topic` and returns its offset.
    pub fn publish(&self, topic: &str, payload: Option<Vec<u8>>) -> i64 {
        let offset = {
            let mut state = self.state();
            let next = state.next_offsets.entry(topic.to_string()).or_insert(0);
            let offset = *next;
            *next += 1;
            state.pending.push_back(LogMessage {
                topic: topic.to_string(),
                partition: 0,
                offset,
                payload,
            });
            offset
        };
        self.inner.notify.notify_one();
        offset
    }

    /// Appends a serialized event to `topic`.
    pub fn publish_json(&self, topic: Topic, event: &serde_json::Value) -> i64 {
        self.publish(topic.as_str(), Some(event.to_string().into_bytes()))
    }

    /// Messages marked handled, in order.
    pub fn handled(&self) -> Vec<LogMessage> {
        self.state().handled.clone()
    }

    pub fn handled_count(&self) -> usize {
        self.state().handled.len()
    }

    pub fn subscribed(&self) -> Vec<Topic> {
        self.state().subscribed.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    fn next_message(&self) -> Option<LogMessage> {
        let mut state = self.state();
        let position = state.pending.iter().position(|message| {
            state
                .subscribed
                .iter()
                .any(|topic| topic.as_str() == message.topic)
        })?;
        state.pending.remove(position)
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    fn subscribe(&self, topics: &[Topic]) -> Result<()> {
        self.state().subscribed = topics.to_vec();
        self.inner.closed.store(false, Ordering::SeqCst);
        self.inner.notify.notify_one();
        Ok(())
    }

    async fn poll(&self, timeout: Duration) -> Option<Result<LogMessage>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(message) = self.next_message() {
                return Some(Ok(message));
            }
            tokio::time::timeout_at(deadline, self.inner.notify.notified())
                .await
                .ok()?;
        }
    }

    fn mark_handled(&self, message: &LogMessage) -> Result<()> {
        self.state().handled.push(message.clone());
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.state().subscribed.clear();
        self.inner.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_delivers_only_subscribed_topics() {
        let log = InMemoryEventLog::new();
        log.publish("post", Some(b"post".to_vec()));
        log.publish("user", Some(b"user".to_vec()));
        log.subscribe(&[Topic::User]).unwrap();

        let message = log.poll(Duration::from_millis(10)).await.unwrap().unwrap();
        assert_eq!(message.topic, "user");
        assert!(log.poll(Duration::from_millis(10)).await.is_none());
    }

    #[tokio::test]
    async fn test_offsets_are_per_topic() {
        let log = InMemoryEventLog::new();
        assert_eq!(log.publish("user", None), 0);
        assert_eq!(log.publish("user", None), 1);
        assert_eq!(log.publish("order", None), 0);
    }

    #[tokio::test]
    async fn test_poll_wakes_on_publish() {
        let log = InMemoryEventLog::new();
        log.subscribe(&[Topic::Order]).unwrap();

        let publisher = log.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            publisher.publish("order", Some(b"{}".to_vec()));
        });

        let message = log.poll(Duration::from_secs(5)).await.unwrap().unwrap();
        assert_eq!(message.offset, 0);
    }

    #[tokio::test]
    async fn test_close_clears_subscription() {
        let log = InMemoryEventLog::new();
        log.subscribe(&Topic::ALL).unwrap();
        log.close().unwrap();
        assert!(log.is_closed());
        assert!(log.subscribed().is_empty());
    }
}
