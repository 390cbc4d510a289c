//! Domain model for marketplace tasks.
//!
//! Tasks move through a closed status set, carry an optional escrow record,
//! and own a timestamped chat log. Infrastructure concerns stay outside the
//! domain boundary.

mod error;
mod ids;
mod message;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{MessageId, TaskId};
pub use message::{PersistedMessageData, TaskMessage};
pub use task::{MAX_TITLE_CHARS, PersistedTaskData, Task, TaskDraft, TaskStatus};
