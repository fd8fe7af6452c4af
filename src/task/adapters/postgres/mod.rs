//! `PostgreSQL` adapter for task persistence.

pub mod models;
mod repository;
pub mod schema;

pub use repository::{PostgresTaskRepository, TaskPgPool};
