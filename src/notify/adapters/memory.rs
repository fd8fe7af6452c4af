//! In-memory broker and recording channel for unit testing.
//!
//! The broker keeps a retained per-topic log of JSON payloads so the wire
//! format is exercised even without a real transport, and fans appended
//! messages out to one bounded queue per consumer group.

use crate::notify::{
    domain::NotificationMessage,
    ports::{BrokerError, BrokerResult, ChannelResult, NotificationBroker, NotificationChannel},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

/// Queue headroom granted to every consumer group beyond the replayed
/// backlog.
const GROUP_QUEUE_CAPACITY: usize = 256;

/// Thread-safe in-memory notification broker.
///
/// A group subscribing after messages were appended replays the retained
/// log from the start. One active receiver is allowed per consumer group;
/// a dropped receiver frees the group name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBroker {
    topics: Arc<RwLock<HashMap<String, TopicState>>>,
}

#[derive(Debug, Default)]
struct TopicState {
    log: Vec<String>,
    groups: HashMap<String, mpsc::Sender<NotificationMessage>>,
}

impl InMemoryBroker {
    /// Creates an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message appended to the topic, oldest first.
    #[must_use]
    pub fn published(&self, topic: &str) -> Vec<NotificationMessage> {
        self.topics
            .read()
            .map(|guard| {
                guard.get(topic).map_or_else(Vec::new, |state| {
                    state
                        .log
                        .iter()
                        .filter_map(|payload| serde_json::from_str(payload).ok())
                        .collect()
                })
            })
            .unwrap_or_default()
    }

    fn lock_error(message: &str) -> BrokerError {
        BrokerError::transport(std::io::Error::other(message.to_owned()))
    }
}

#[async_trait]
impl NotificationBroker for InMemoryBroker {
    async fn append(&self, topic: &str, message: &NotificationMessage) -> BrokerResult<()> {
        let payload = serde_json::to_string(message).map_err(BrokerError::serialization)?;
        let delivered: NotificationMessage =
            serde_json::from_str(&payload).map_err(BrokerError::serialization)?;

        let mut guard = self
            .topics
            .write()
            .map_err(|_| Self::lock_error("broker lock poisoned"))?;
        let state = guard.entry(topic.to_owned()).or_default();
        state.log.push(payload);

        // A full or disconnected group queue drops the group, not the
        // append; the retained log is the durable record.
        state
            .groups
            .retain(|_, sender| sender.try_send(delivered.clone()).is_ok());
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
        group_id: &str,
    ) -> BrokerResult<mpsc::Receiver<NotificationMessage>> {
        let mut guard = self
            .topics
            .write()
            .map_err(|_| Self::lock_error("broker lock poisoned"))?;
        let state = guard.entry(topic.to_owned()).or_default();

        if state
            .groups
            .get(group_id)
            .is_some_and(|sender| !sender.is_closed())
        {
            return Err(BrokerError::GroupTaken(group_id.to_owned()));
        }

        let (sender, receiver) = mpsc::channel(state.log.len() + GROUP_QUEUE_CAPACITY);
        for payload in &state.log {
            let replayed: NotificationMessage =
                serde_json::from_str(payload).map_err(BrokerError::serialization)?;
            sender
                .try_send(replayed)
                .map_err(|_| Self::lock_error("replay overflowed group queue"))?;
        }
        state.groups.insert(group_id.to_owned(), sender);
        Ok(receiver)
    }
}

/// Record of one channel delivery captured by [`RecordingChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    /// Recipient address the send targeted.
    pub recipient: String,
    /// Delivered subject line.
    pub subject: String,
    /// Delivered body.
    pub body: String,
}

/// Channel that records every send for test assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    sent: Arc<RwLock<Vec<SentNotification>>>,
}

impl RecordingChannel {
    /// Creates an empty recording channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every delivery performed so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Returns the number of deliveries performed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sent.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns `true` when nothing has been delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, recipient: &str, subject: &str, body: &str) -> ChannelResult<()> {
        if let Ok(mut guard) = self.sent.write() {
            guard.push(SentNotification {
                recipient: recipient.to_owned(),
                subject: subject.to_owned(),
                body: body.to_owned(),
            });
        }
        Ok(())
    }
}
