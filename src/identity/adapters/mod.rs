//! Persistence adapters for profiles.
//!
//! - [`memory::InMemoryProfileRepository`]: thread-safe in-memory storage
//! - [`postgres::PostgresProfileRepository`]: Diesel-backed `PostgreSQL`
//!   storage with JSONB wallet and review documents

pub mod memory;
pub mod postgres;
