//! The poll loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use common::{EventType, Topic};
use projections::EventHandler;
use tokio::sync::watch;
use tracing::Instrument;

use crate::Result;
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::log::{EventLog, LogMessage};
use crate::signal::shutdown_signal;

/// Counts of what the loop did between `start` and exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub polled: u64,
    pub applied: u64,
    /// Decode failures, unknown event types and unhandled event types.
    pub skipped: u64,
    pub failed: u64,
}

impl ConsumerStats {
    fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Applied => self.applied += 1,
            DispatchOutcome::DecodeFailed
            | DispatchOutcome::UnknownEventType
            | DispatchOutcome::Unhandled => self.skipped += 1,
            DispatchOutcome::HandlerFailed => self.failed += 1,
        }
    }
}

/// Cloneable handle that requests the loop to stop.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Requests stop. Calling it more than once has no further effect.
    pub fn stop(&self) {
        if !self.tx.send_replace(true) {
            tracing::info!("stop requested");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Completes once stop has been requested.
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so this only returns once stopped.
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

/// Consumes the event log and dispatches every message in order.
pub struct EventConsumer<L> {
    log: L,
    dispatcher: Dispatcher,
    poll_timeout: Duration,
    topics: Vec<Topic>,
    stop: StopHandle,
    consuming: Arc<AtomicBool>,
    handle_signals: bool,
}

impl<L: EventLog> EventConsumer<L> {
    pub fn new(log: L, dispatcher: Dispatcher, poll_timeout: Duration) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            log,
            dispatcher,
            poll_timeout,
            topics: Vec::new(),
            stop: StopHandle { tx: Arc::new(tx) },
            consuming: Arc::new(AtomicBool::new(false)),
            handle_signals: true,
        }
    }

    /// Disables the SIGINT/SIGTERM listener installed by [`Self::start`].
    pub fn without_signal_handling(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    /// Registers `handler` for `event_type`. The last registration wins.
    pub fn register_handler(&mut self, event_type: EventType, handler: Arc<dyn EventHandler>) {
        self.dispatcher.register_handler(event_type, handler);
    }

    /// Subscribes to `topics`, or to every known topic when none are given.
    pub fn subscribe(&mut self, topics: Option<&[Topic]>) -> Result<()> {
        let topics: &[Topic] = match topics {
            Some(topics) if !topics.is_empty() => topics,
            _ => &Topic::ALL,
        };
        self.log.subscribe(topics)?;
        self.topics = topics.to_vec();
        Ok(())
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Requests the loop to stop after the message in flight.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Flag that is `true` while the poll loop is running.
    pub fn consuming_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.consuming)
    }

    /// Runs the poll loop until stop is requested, then flushes offsets and
    /// closes the log.
    pub async fn start(&mut self) -> Result<ConsumerStats> {
        if self.topics.is_empty() {
            self.subscribe(None)?;
        }

        let signals = self.handle_signals.then(|| {
            let stop = self.stop_handle();
            tokio::spawn(async move {
                shutdown_signal().await;
                stop.stop();
            })
        });

        let mut stop_rx = self.stop.tx.subscribe();
        let mut stats = ConsumerStats::default();
        self.consuming.store(true, Ordering::SeqCst);
        tracing::info!(
            topics = ?self.topics,
            handlers = self.dispatcher.handler_count(),
            "consumer started"
        );

        while !*stop_rx.borrow_and_update() {
            let polled = tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                polled = self.log.poll(self.poll_timeout) => polled,
            };

            let message = match polled {
                None => continue,
                Some(Ok(message)) => message,
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "poll failed");
                    continue;
                }
            };

            stats.polled += 1;
            let outcome = self.process(&message).await;
            stats.record(outcome);
            metrics::counter!("consumer_messages_total", "outcome" => outcome.as_str())
                .increment(1);

            if let Err(err) = self.log.mark_handled(&message) {
                tracing::warn!(
                    topic = %message.topic,
                    partition = message.partition,
                    offset = message.offset,
                    error = %err,
                    "failed to store offset"
                );
            }
        }

        self.consuming.store(false, Ordering::SeqCst);
        if let Some(signals) = signals {
            signals.abort();
        }

        let closed = self.log.close();
        tracing::info!(
            polled = stats.polled,
            applied = stats.applied,
            skipped = stats.skipped,
            failed = stats.failed,
            "consumer stopped"
        );
        closed.map(|()| stats)
    }

    async fn process(&self, message: &LogMessage) -> DispatchOutcome {
        let span = tracing::info_span!(
            "message",
            topic = %message.topic,
            partition = message.partition,
            offset = message.offset
        );

        async {
            match &message.payload {
                Some(payload) => self.dispatcher.dispatch(payload).await,
                None => {
                    tracing::warn!("message without payload, skipping");
                    DispatchOutcome::DecodeFailed
                }
            }
        }
        .instrument(span)
        .await
    }
}
