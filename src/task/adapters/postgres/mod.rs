//! `PostgreSQL` adapters for task and chat log persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskMessageRepository, PostgresTaskRepository, TaskPgPool};
