//! Broker port carrying serialized notification messages.

use crate::notify::domain::NotificationMessage;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Durable, at-least-once message channel decoupling the publisher from
/// delivery workers in time and process.
///
/// Consumer groups share a subscription cursor: within one group a message
/// is delivered to at most one active worker. Ordering holds only within a
/// partition of the underlying transport; consumers must not rely on
/// cross-message ordering.
#[async_trait]
pub trait NotificationBroker: Send + Sync {
    /// Appends one message to the named topic.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Serialization`] when the payload cannot be
    /// encoded and [`BrokerError::Transport`] when the broker is
    /// unreachable.
    async fn append(&self, topic: &str, message: &NotificationMessage) -> BrokerResult<()>;

    /// Subscribes a consumer group to the named topic.
    ///
    /// The returned receiver yields messages until the broker shuts down.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::GroupTaken`] when the group already has an
    /// active receiver.
    async fn subscribe(
        &self,
        topic: &str,
        group_id: &str,
    ) -> BrokerResult<mpsc::Receiver<NotificationMessage>>;
}

/// Errors returned by broker implementations.
#[derive(Debug, Clone, Error)]
pub enum BrokerError {
    /// The message payload could not be encoded or decoded.
    #[error("broker serialization error: {0}")]
    Serialization(Arc<serde_json::Error>),

    /// The consumer group already holds an active subscription.
    #[error("consumer group already subscribed: {0}")]
    GroupTaken(String),

    /// Transport-layer failure.
    #[error("broker transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl BrokerError {
    /// Wraps a serialization error.
    #[must_use]
    pub fn serialization(err: serde_json::Error) -> Self {
        Self::Serialization(Arc::new(err))
    }

    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
