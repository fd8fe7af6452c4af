//! Adapter implementations of the notification ports.

pub mod memory;
pub mod stub;

pub use memory::{InMemoryBroker, RecordingChannel, SentNotification};
pub use stub::{ChatChannel, PushChannel, SmsChannel};
