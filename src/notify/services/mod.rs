//! Application services for notification publishing and delivery.

mod consumer;
mod publisher;

pub use consumer::{ChannelRegistry, ConsumerConfig, NotificationConsumer};
pub use publisher::{NotificationConfig, NotificationPublisher, PublishError};
