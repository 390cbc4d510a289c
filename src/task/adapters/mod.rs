//! Persistence adapters for tasks and chat logs.
//!
//! - [`memory`]: thread-safe in-memory storage
//! - [`postgres`]: Diesel-backed `PostgreSQL` storage
//! - [`observed::ObservedTaskRepository`]: decorator publishing task-list
//!   snapshots after every successful write

pub mod memory;
pub mod observed;
pub mod postgres;
