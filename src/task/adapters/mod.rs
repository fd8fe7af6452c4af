//! Adapter implementations of the task ports.

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryTaskRepository, InMemoryUserDirectory};
pub use postgres::{PostgresTaskRepository, TaskPgPool};
