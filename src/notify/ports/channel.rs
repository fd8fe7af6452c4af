//! Delivery channel port for notification messages.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for channel sends.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// A concrete delivery mechanism (email today; SMS, push, and chat are
/// extension points).
///
/// Channels receive the message's subject and body verbatim; rendering
/// happened at publish time.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Stable channel name used in dispatch logs.
    fn name(&self) -> &'static str;

    /// Delivers one notification to the recipient.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Delivery`] when the send fails. The consumer
    /// logs the failure and moves on; there is no retry or dead-letter
    /// path.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> ChannelResult<()>;
}

/// Errors returned by channel implementations.
#[derive(Debug, Clone, Error)]
pub enum ChannelError {
    /// The delivery attempt failed.
    #[error("delivery error: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl ChannelError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
