//! Adapter implementations of the audit ports.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAuditSink;
pub use postgres::{AuditPgPool, PostgresAuditSink};
