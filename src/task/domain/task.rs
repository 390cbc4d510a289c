//! Task aggregate root and lifecycle status.

use super::{ParseTaskStatusError, TaskDomainError, TaskId};
use crate::escrow::domain::{EscrowRecord, SettlementReceipt};
use crate::identity::domain::UserId;
use crate::wallet::domain::Lamports;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted task title, in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Posted and awaiting a provider.
    Open,
    /// Accepted by a provider.
    Accepted,
    /// Marked done by a participant, settlement pending.
    Finalized,
    /// Settled.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Accepted => "accepted",
            Self::Finalized => "finalized",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` when `self -> target` is a permitted transition.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::Accepted)
                | (Self::Accepted, Self::Finalized | Self::Completed)
                | (Self::Finalized, Self::Completed)
        )
    }

    /// Returns `true` when no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "accepted" => Ok(Self::Accepted),
            "finalized" => Ok(Self::Finalized),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creator-supplied fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Free-text category.
    pub category: String,
    /// Posting user.
    pub creator: UserId,
    /// Promised payment.
    pub deposit: Lamports,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    category: String,
    deposit: Lamports,
    status: TaskStatus,
    creator: UserId,
    assignee: Option<UserId>,
    escrow: Option<EscrowRecord>,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted category.
    pub category: String,
    /// Persisted deposit.
    pub deposit: Lamports,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted creator.
    pub creator: UserId,
    /// Persisted assignee, if any.
    pub assignee: Option<UserId>,
    /// Persisted escrow record, if any.
    pub escrow: Option<EscrowRecord>,
    /// Persisted write revision.
    pub revision: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates an open, unassigned task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] for a blank title,
    /// [`TaskDomainError::TitleTooLong`] past [`MAX_TITLE_CHARS`], or
    /// [`TaskDomainError::ZeroDeposit`] for a zero deposit.
    pub fn new(draft: TaskDraft, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(TaskDomainError::TitleTooLong {
                max: MAX_TITLE_CHARS,
            });
        }
        if draft.deposit.is_zero() {
            return Err(TaskDomainError::ZeroDeposit);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            title: title.to_owned(),
            description: draft.description,
            category: draft.category,
            deposit: draft.deposit,
            status: TaskStatus::Open,
            creator: draft.creator,
            assignee: None,
            escrow: None,
            revision: 0,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            category: data.category,
            deposit: data.deposit,
            status: data.status,
            creator: data.creator,
            assignee: data.assignee,
            escrow: data.escrow,
            revision: data.revision,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the promised payment.
    #[must_use]
    pub const fn deposit(&self) -> Lamports {
        self.deposit
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the posting user.
    #[must_use]
    pub const fn creator(&self) -> &UserId {
        &self.creator
    }

    /// Returns the accepting provider, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<&UserId> {
        self.assignee.as_ref()
    }

    /// Returns the escrow record, if a deposit was made.
    #[must_use]
    pub const fn escrow(&self) -> Option<&EscrowRecord> {
        self.escrow.as_ref()
    }

    /// Returns the write revision this copy was read at.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when `user` is the creator or the assignee.
    #[must_use]
    pub fn is_participant(&self, user: &UserId) -> bool {
        &self.creator == user || self.assignee.as_ref() == Some(user)
    }

    /// Moves the task to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the transition is
    /// not permitted from the current status.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_transition(target)?;
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Checks that `target` is reachable without mutating the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when it is not.
    pub const fn ensure_transition(&self, target: TaskStatus) -> Result<(), TaskDomainError> {
        if self.status.can_transition_to(target) {
            Ok(())
        } else {
            Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            })
        }
    }

    /// Assigns the task to `provider` and moves it to accepted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfAcceptance`] when `provider` created
    /// the task or [`TaskDomainError::InvalidTransition`] when it is not open.
    pub fn accept(&mut self, provider: UserId, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if provider == self.creator {
            return Err(TaskDomainError::SelfAcceptance(self.id));
        }
        self.transition_to(TaskStatus::Accepted, clock)?;
        self.assignee = Some(provider);
        Ok(())
    }

    /// Moves an accepted task to finalized on behalf of `finalizer`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotParticipant`] when `finalizer` is
    /// neither creator nor assignee, or
    /// [`TaskDomainError::InvalidTransition`] when the task is not accepted.
    pub fn finalize(&mut self, finalizer: &UserId, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if !self.is_participant(finalizer) {
            return Err(TaskDomainError::NotParticipant {
                task_id: self.id,
                user_id: finalizer.clone(),
            });
        }
        self.transition_to(TaskStatus::Finalized, clock)
    }

    /// Attaches the task's escrow record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EscrowAlreadyExists`] when one is attached.
    pub fn attach_escrow(
        &mut self,
        escrow: EscrowRecord,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.escrow.is_some() {
            return Err(TaskDomainError::EscrowAlreadyExists(self.id));
        }
        self.escrow = Some(escrow);
        self.touch(clock);
        Ok(())
    }

    /// Releases the attached escrow with a settlement receipt.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NoEscrow`] when no escrow is attached or
    /// [`TaskDomainError::Escrow`] when it was already released.
    pub fn release_escrow(
        &mut self,
        receipt: SettlementReceipt,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let task_id = self.id;
        self.escrow
            .as_mut()
            .ok_or(TaskDomainError::NoEscrow(task_id))?
            .release(receipt, clock)
            .map_err(|source| TaskDomainError::Escrow { task_id, source })?;
        self.touch(clock);
        Ok(())
    }

    /// Releases the attached escrow without settlement, tagging it
    /// unverified with `reason`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NoEscrow`] when no escrow is attached or
    /// [`TaskDomainError::Escrow`] when it was already released.
    pub fn release_escrow_unverified(
        &mut self,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let task_id = self.id;
        self.escrow
            .as_mut()
            .ok_or(TaskDomainError::NoEscrow(task_id))?
            .release_unverified(reason, clock)
            .map_err(|source| TaskDomainError::Escrow { task_id, source })?;
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    /// Returns the copy a repository stores after a successful update.
    #[must_use]
    pub(crate) fn into_next_revision(mut self) -> Self {
        self.revision = self.revision.saturating_add(1);
        self
    }
}
