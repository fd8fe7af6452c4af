//! Stub channels for delivery mechanisms that are named extension points.
//!
//! SMS, push, and chat delivery are not implemented. The stubs log the
//! intent and succeed so a registry wired with them degrades visibly
//! rather than silently.

use crate::notify::ports::{ChannelResult, NotificationChannel};
use async_trait::async_trait;
use tracing::info;

/// SMS delivery stub.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmsChannel;

#[async_trait]
impl NotificationChannel for SmsChannel {
    fn name(&self) -> &'static str {
        "sms"
    }

    async fn send(&self, recipient: &str, subject: &str, _body: &str) -> ChannelResult<()> {
        info!(recipient, subject, "sms delivery not implemented; skipping");
        Ok(())
    }
}

/// Push-notification delivery stub.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushChannel;

#[async_trait]
impl NotificationChannel for PushChannel {
    fn name(&self) -> &'static str {
        "push"
    }

    async fn send(&self, recipient: &str, subject: &str, _body: &str) -> ChannelResult<()> {
        info!(recipient, subject, "push delivery not implemented; skipping");
        Ok(())
    }
}

/// Chat delivery stub.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatChannel;

#[async_trait]
impl NotificationChannel for ChatChannel {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn send(&self, recipient: &str, subject: &str, _body: &str) -> ChannelResult<()> {
        info!(recipient, subject, "chat delivery not implemented; skipping");
        Ok(())
    }
}
