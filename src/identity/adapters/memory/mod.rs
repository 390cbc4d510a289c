//! In-memory adapter implementations for testing.

mod profile;

pub use profile::InMemoryProfileRepository;
