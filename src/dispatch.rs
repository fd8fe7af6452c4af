//! Commit-gated dispatch of task domain events.
//!
//! Events raised while a mutation is in flight are buffered in an
//! [`EventBuffer`] owned by that mutation. Once the backing store reports a
//! successful commit, the buffer is handed to [`EventDispatcher::commit`],
//! which releases the events to subscribers on a background task. Dropping
//! the buffer without committing is the rollback path: the events are
//! discarded and no subscriber ever observes them.

use crate::task::domain::TaskEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::warn;

/// Error surfaced by an event subscriber.
///
/// The dispatcher logs subscriber errors and drops them; a committed
/// transaction is never affected by a failing subscriber, and failed
/// deliveries are not retried.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct SubscriberError(Arc<dyn std::error::Error + Send + Sync>);

impl SubscriberError {
    /// Wraps a subscriber failure.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}

/// Receiver of committed task events.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Stable subscriber name used in failure logs.
    fn name(&self) -> &'static str;

    /// Handles one committed event.
    ///
    /// Invoked at most once per event. Errors are logged by the dispatcher
    /// and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriberError`] when handling fails; the dispatcher does
    /// not retry.
    async fn on_event(&self, event: &TaskEvent) -> Result<(), SubscriberError>;
}

/// Per-transaction event buffer.
///
/// Exclusively owned by the mutation that created it and never shared
/// across concurrent transactions. Dropping it without committing discards
/// the buffered events.
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Vec<TaskEvent>,
}

impl EventBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Buffers an event raised inside the current transaction.
    pub fn raise(&mut self, event: TaskEvent) {
        self.events.push(event);
    }

    /// Returns the number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` when nothing has been raised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Releases committed event buffers to registered subscribers.
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no subscribers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Registers a subscriber for all committed events.
    pub fn subscribe(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Releases a committed buffer to subscribers on a background task.
    ///
    /// Events from the buffer reach each subscriber in emission order; no
    /// ordering holds across different commits. The caller's thread never
    /// runs subscriber code, so broker latency stays off the request path.
    /// Callers detach the returned handle; tests may await it to observe
    /// the flush.
    pub fn commit(&self, buffer: EventBuffer) -> JoinHandle<()> {
        let events = buffer.events;
        let subscribers = self.subscribers.clone();
        tokio::spawn(async move {
            for event in &events {
                for subscriber in &subscribers {
                    if let Err(error) = subscriber.on_event(event).await {
                        warn!(
                            subscriber = subscriber.name(),
                            event = event.kind(),
                            task_id = %event.task_id(),
                            %error,
                            "event subscriber failed; dropping event for this subscriber"
                        );
                    }
                }
            }
        })
    }
}
