//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use crate::escrow::domain::EscrowDomainError;
use crate::identity::domain::UserId;
use thiserror::Error;

/// Errors returned while constructing or mutating tasks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title is longer than storage accepts.
    #[error("task title must be at most {max} characters")]
    TitleTooLong {
        /// Character limit.
        max: usize,
    },

    /// The task deposit is zero.
    #[error("task deposit must be greater than zero")]
    ZeroDeposit,

    /// A chat message body is empty after trimming.
    #[error("message body must not be empty")]
    EmptyMessage,

    /// The requested status change is not permitted from the current status.
    #[error("invalid transition for task {task_id}: {from} -> {to}")]
    InvalidTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// A creator tried to accept their own task.
    #[error("creator cannot accept their own task {0}")]
    SelfAcceptance(TaskId),

    /// The user is neither the creator nor the assignee.
    #[error("user {user_id} is not a participant of task {task_id}")]
    NotParticipant {
        /// Task being acted on.
        task_id: TaskId,
        /// Acting user.
        user_id: UserId,
    },

    /// An escrow record is already attached.
    #[error("escrow already exists for task {0}")]
    EscrowAlreadyExists(TaskId),

    /// No escrow record is attached.
    #[error("no escrow exists for task {0}")]
    NoEscrow(TaskId),

    /// The attached escrow rejected the change.
    #[error("escrow for task {task_id}: {source}")]
    Escrow {
        /// Task owning the escrow.
        task_id: TaskId,
        /// Escrow-level failure.
        source: EscrowDomainError,
    },
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
