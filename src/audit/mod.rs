//! Append-only audit trail for entity mutations.
//!
//! Every mutation anywhere in the system leaves an immutable record of who
//! did what to which entity and when, recorded independently of whether
//! downstream notifications succeed. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The fire-and-forget recorder in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
