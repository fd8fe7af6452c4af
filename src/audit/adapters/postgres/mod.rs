//! `PostgreSQL` adapter for the audit trail.

pub mod models;
pub mod schema;
mod sink;

pub use sink::{AuditPgPool, PostgresAuditSink};
