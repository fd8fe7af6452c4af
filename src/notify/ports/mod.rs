//! Port contracts for notification transport and delivery.

pub mod broker;
pub mod channel;

pub use broker::{BrokerError, BrokerResult, NotificationBroker};
pub use channel::{ChannelError, ChannelResult, NotificationChannel};
