//! Delivery worker reading the notification topic.

use crate::notify::{
    domain::{NotificationKind, NotificationMessage},
    ports::{BrokerError, NotificationBroker, NotificationChannel},
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Consumer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// Topic to subscribe to.
    pub topic: String,
    /// Consumer group identity shared by parallel workers.
    pub group_id: String,
}

impl ConsumerConfig {
    /// Creates a configuration for the given topic and group.
    #[must_use]
    pub fn new(topic: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            group_id: group_id.into(),
        }
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self::new("notifications", "notification-consumer-group")
    }
}

/// Maps notification kinds to zero or more delivery channels.
///
/// New channels register here instead of editing the dispatch loop; a kind
/// with no channels is completed with a warning rather than treated as a
/// poison message.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: HashMap<NotificationKind, Vec<Arc<dyn NotificationChannel>>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a channel for one notification kind.
    #[must_use]
    pub fn with_channel(
        mut self,
        kind: NotificationKind,
        channel: Arc<dyn NotificationChannel>,
    ) -> Self {
        self.channels.entry(kind).or_default().push(channel);
        self
    }

    /// Registers a channel for every notification kind.
    #[must_use]
    pub fn with_channel_for_all(self, channel: &Arc<dyn NotificationChannel>) -> Self {
        [
            NotificationKind::TaskAssigned,
            NotificationKind::TaskStatusChanged,
            NotificationKind::TaskReminder,
            NotificationKind::TaskOverdue,
        ]
        .into_iter()
        .fold(self, |registry, kind| {
            registry.with_channel(kind, Arc::clone(channel))
        })
    }

    /// Returns the channels registered for a kind.
    #[must_use]
    pub fn channels_for(&self, kind: NotificationKind) -> &[Arc<dyn NotificationChannel>] {
        self.channels.get(&kind).map_or(&[], Vec::as_slice)
    }
}

/// Long-lived worker loop delivering broker messages through channels.
///
/// Runs independently of the producing transaction, possibly in another
/// process. Delivery is at-least-once: a channel failure is logged and the
/// message completes without retry or dead-lettering.
pub struct NotificationConsumer<B>
where
    B: NotificationBroker,
{
    broker: Arc<B>,
    registry: ChannelRegistry,
    config: ConsumerConfig,
}

impl<B> NotificationConsumer<B>
where
    B: NotificationBroker,
{
    /// Creates a consumer over the given broker and channel registry.
    #[must_use]
    pub const fn new(broker: Arc<B>, registry: ChannelRegistry, config: ConsumerConfig) -> Self {
        Self {
            broker,
            registry,
            config,
        }
    }

    /// Subscribes and processes messages until shutdown.
    ///
    /// A shutdown signal lets the in-flight dispatch finish before the loop
    /// exits; a closed stream ends the loop as well.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the initial subscription fails.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), BrokerError> {
        let mut stream = self
            .broker
            .subscribe(&self.config.topic, &self.config.group_id)
            .await?;
        info!(
            topic = %self.config.topic,
            group = %self.config.group_id,
            "notification consumer subscribed"
        );

        loop {
            let received = tokio::select! {
                next = stream.recv() => next,
                _ = shutdown.changed() => None,
            };
            let Some(message) = received else {
                break;
            };
            self.dispatch(&message).await;
            if *shutdown.borrow() {
                break;
            }
        }

        info!(
            topic = %self.config.topic,
            group = %self.config.group_id,
            "notification consumer drained and stopped"
        );
        Ok(())
    }

    /// Delivers one message to every channel registered for its kind.
    async fn dispatch(&self, message: &NotificationMessage) {
        let channels = self.registry.channels_for(message.kind);
        if channels.is_empty() {
            warn!(
                kind = %message.kind,
                task_id = %message.task_id,
                recipient = %message.recipient,
                "no channel configured for notification kind; completing message"
            );
            return;
        }

        for channel in channels {
            match channel.send(&message.recipient, &message.subject, &message.body).await {
                Ok(()) => info!(
                    channel = channel.name(),
                    kind = %message.kind,
                    task_id = %message.task_id,
                    recipient = %message.recipient,
                    "notification delivered"
                ),
                Err(err) => error!(
                    channel = channel.name(),
                    kind = %message.kind,
                    task_id = %message.task_id,
                    recipient = %message.recipient,
                    error = %err,
                    "notification delivery failed; message completed without retry"
                ),
            }
        }
    }
}
