//! In-memory adapters for tasks and chat logs.

mod message;
mod task;

pub use message::InMemoryTaskMessageRepository;
pub use task::InMemoryTaskRepository;
