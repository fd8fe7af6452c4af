//! Notification pipeline from committed task events to delivery channels.
//!
//! The publisher subscribes to the commit-gated dispatcher, maps events
//! onto channel-agnostic messages, and appends them to a broker topic.
//! Delivery workers consume that topic independently of the producing
//! transaction and fan each message out to the channels registered for its
//! kind. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Publisher and consumer services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
