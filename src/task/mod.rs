//! Task lifecycle management for Herald.
//!
//! Tasks are created, reassigned, transitioned, and deleted through a
//! command service that owns every state transition inside one transaction
//! boundary, raising commit-gated domain events and fire-and-forget audit
//! records as side effects. A periodic scanner raises reminder events for
//! tasks approaching their due date through the same path. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
