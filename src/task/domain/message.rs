//! Task chat messages.

use super::{MessageId, TaskDomainError, TaskId};
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A message in a task's chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMessage {
    id: MessageId,
    task_id: TaskId,
    sender: UserId,
    body: String,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMessageData {
    /// Persisted message identifier.
    pub id: MessageId,
    /// Owning task.
    pub task_id: TaskId,
    /// Persisted sender.
    pub sender: UserId,
    /// Persisted body.
    pub body: String,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TaskMessage {
    /// Creates a message stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyMessage`] when the body is blank.
    pub fn new(
        task_id: TaskId,
        sender: UserId,
        body: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(TaskDomainError::EmptyMessage);
        }
        Ok(Self {
            id: MessageId::new(),
            task_id,
            sender,
            body,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a message from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMessageData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            sender: data.sender,
            body: data.body,
            created_at: data.created_at,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the sender.
    #[must_use]
    pub const fn sender(&self) -> &UserId {
        &self.sender
    }

    /// Returns the message body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
