//! Repository ports for task and chat message persistence.

use crate::identity::domain::UserId;
use crate::task::domain::{Task, TaskId, TaskMessage};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Single-task writes are atomic. [`Self::update`] is a compare-and-set on
/// [`Task::revision`], which is what gives concurrent acceptors exactly one
/// winner.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Replaces a task if its stored revision still equals
    /// `task.revision()`, and returns the stored copy with the advanced
    /// revision.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::Conflict`] when another writer updated it
    /// first.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task>;

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task, newest first.
    async fn list(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the tasks posted by `creator`, newest first.
    async fn find_by_creator(&self, creator: &UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the tasks accepted by `assignee`, newest first.
    async fn find_by_assignee(&self, assignee: &UserId) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored revision moved past the one the caller read.
    #[error("task {id} was modified concurrently (expected revision {expected})")]
    Conflict {
        /// Task being updated.
        id: TaskId,
        /// Revision the caller read.
        expected: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Chat log persistence contract.
#[async_trait]
pub trait TaskMessageRepository: Send + Sync {
    /// Appends a message to its task's log.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the write fails.
    async fn append(&self, message: &TaskMessage) -> TaskRepositoryResult<()>;

    /// Returns a task's messages, oldest first.
    async fn list_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskMessage>>;
}
