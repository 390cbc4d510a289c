//! Service layer for the task lifecycle: posting, acceptance, finalization,
//! and the task chat log.

use crate::escrow::{
    domain::EscrowRecord,
    ports::EscrowSettlement,
    services::{DepositOutcome, DepositRequest, EscrowService, EscrowServiceError},
};
use crate::identity::domain::UserId;
use crate::task::{
    domain::{Task, TaskDomainError, TaskDraft, TaskId, TaskMessage, TaskStatus},
    ports::{TaskMessageRepository, TaskRepository, TaskRepositoryError},
};
use crate::wallet::domain::Lamports;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const MAX_WRITE_ATTEMPTS: usize = 5;

/// Request payload for posting a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: String,
    category: String,
    creator: UserId,
    deposit: Lamports,
}

impl CreateTaskRequest {
    /// Creates a request with required task fields.
    #[must_use]
    pub fn new(title: impl Into<String>, creator: UserId, deposit: Lamports) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: String::new(),
            creator,
            deposit,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the task category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    fn into_draft(self) -> TaskDraft {
        TaskDraft {
            title: self.title,
            description: self.description,
            category: self.category,
            creator: self.creator,
            deposit: self.deposit,
        }
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Escrow operation failed.
    #[error(transparent)]
    Escrow(#[from] EscrowServiceError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// Concurrent writers kept winning the task update.
    #[error("task {0} is under heavy concurrent modification")]
    Contention(TaskId),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
pub struct TaskLifecycleService<R, M, S, C>
where
    R: TaskRepository,
    M: TaskMessageRepository,
    S: EscrowSettlement,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    messages: Arc<M>,
    escrow: EscrowService<R, S, C>,
    clock: Arc<C>,
}

impl<R, M, S, C> Clone for TaskLifecycleService<R, M, S, C>
where
    R: TaskRepository,
    M: TaskMessageRepository,
    S: EscrowSettlement,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            messages: Arc::clone(&self.messages),
            escrow: self.escrow.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, M, S, C> TaskLifecycleService<R, M, S, C>
where
    R: TaskRepository,
    M: TaskMessageRepository,
    S: EscrowSettlement,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(
        tasks: Arc<R>,
        messages: Arc<M>,
        escrow: EscrowService<R, S, C>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            messages,
            escrow,
            clock,
        }
    }

    /// Returns the escrow service this lifecycle settles through.
    #[must_use]
    pub const fn escrow(&self) -> &EscrowService<R, S, C> {
        &self.escrow
    }

    /// Posts a new open, unassigned task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when validation fails, or
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let task = Task::new(request.into_draft(), &*self.clock)?;
        self.tasks.store(&task).await?;
        info!(task_id = %task.id(), creator = %task.creator(), "task posted");
        Ok(task)
    }

    /// Posts a task and deposits its escrow in one step.
    ///
    /// When the deposit fails the freshly posted task is deleted, so no
    /// unfunded task is left behind.
    ///
    /// # Errors
    ///
    /// Returns the creation error, or [`TaskLifecycleError::Escrow`] with
    /// the deposit error after the task has been removed.
    pub async fn create_and_deposit(
        &self,
        request: CreateTaskRequest,
        from_pubkey: &str,
        amount_sol: f64,
    ) -> TaskLifecycleResult<DepositOutcome> {
        let task = self.create(request).await?;
        let deposit =
            DepositRequest::new(task.creator().clone(), task.id(), from_pubkey, amount_sol);
        match self.escrow.deposit_to_escrow(deposit).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(task_id = %task.id(), error = %err, "deposit failed, removing task");
                if let Err(cleanup) = self.tasks.delete(task.id()).await {
                    warn!(task_id = %task.id(), error = %cleanup, "failed to remove unfunded task");
                }
                Err(err.into())
            }
        }
    }

    /// Accepts an open task on behalf of `provider`.
    ///
    /// Concurrent acceptors race on the task revision: exactly one wins, and
    /// the others see the task as no longer open.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfAcceptance`] when the creator accepts
    /// their own task, [`TaskDomainError::InvalidTransition`] when the task
    /// is not open, or [`TaskLifecycleError::NotFound`].
    pub async fn accept(&self, task_id: TaskId, provider: &UserId) -> TaskLifecycleResult<Task> {
        let task = self
            .modify(task_id, |task, clock| task.accept(provider.clone(), clock))
            .await?;
        info!(%task_id, provider = %provider, "task accepted");
        Ok(task)
    }

    /// Finalizes an accepted task and settles its escrow.
    ///
    /// A failed settlement does not block completion: the task is completed
    /// and its escrow is tagged unverified with the failure reason.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotParticipant`] when `finalizer` is
    /// neither creator nor assignee, [`TaskDomainError::InvalidTransition`]
    /// when the task is not accepted, or [`TaskLifecycleError::NotFound`].
    pub async fn finalize(&self, task_id: TaskId, finalizer: &UserId) -> TaskLifecycleResult<Task> {
        self.modify(task_id, |task, clock| task.finalize(finalizer, clock))
            .await?;
        info!(%task_id, finalizer = %finalizer, "task finalized");

        match self.escrow.transfer_for_task(task_id).await {
            Ok(outcome) => Ok(outcome.task),
            Err(err) => {
                let reason = err.to_string();
                warn!(%task_id, error = %reason, "settlement failed, completing unverified");
                self.modify(task_id, |task, clock| {
                    if task.escrow().is_some_and(EscrowRecord::is_funded) {
                        task.release_escrow_unverified(reason.clone(), clock)?;
                    }
                    task.transition_to(TaskStatus::Completed, clock)
                })
                .await
            }
        }
    }

    /// Applies a validated status transition.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the transition is
    /// not permitted, or [`TaskLifecycleError::NotFound`].
    pub async fn transition(
        &self,
        task_id: TaskId,
        status: TaskStatus,
    ) -> TaskLifecycleResult<Task> {
        self.modify(task_id, |task, clock| task.transition_to(status, clock))
            .await
    }

    /// Appends a message to a task's chat log.
    ///
    /// The task's update time is advanced best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyMessage`] for a blank body, or
    /// [`TaskLifecycleError::NotFound`].
    pub async fn post_message(
        &self,
        task_id: TaskId,
        sender: &UserId,
        body: &str,
    ) -> TaskLifecycleResult<TaskMessage> {
        self.load(task_id).await?;
        let message = TaskMessage::new(task_id, sender.clone(), body, &*self.clock)?;
        self.messages.append(&message).await?;

        let touched = self
            .modify(task_id, |task, clock| {
                task.touch(clock);
                Ok(())
            })
            .await;
        if let Err(err) = touched {
            warn!(%task_id, error = %err, "failed to touch task after message");
        }
        Ok(message)
    }

    /// Returns a task's chat log, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task.
    pub async fn messages(&self, task_id: TaskId) -> TaskLifecycleResult<Vec<TaskMessage>> {
        self.load(task_id).await?;
        Ok(self.messages.list_for_task(task_id).await?)
    }

    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn find(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.tasks.find_by_id(task_id).await?)
    }

    /// Returns every task, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list(&self) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.tasks.list().await?)
    }

    /// Returns the tasks `creator` posted, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_by_creator(&self, creator: &UserId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.tasks.find_by_creator(creator).await?)
    }

    /// Returns the tasks `assignee` accepted, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list_by_assignee(&self, assignee: &UserId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.tasks.find_by_assignee(assignee).await?)
    }

    /// Loads a task, applies `change`, and writes it back with a revision
    /// check. A lost race reloads and re-applies `change` to the fresh copy.
    async fn modify<F>(&self, task_id: TaskId, change: F) -> TaskLifecycleResult<Task>
    where
        F: Fn(&mut Task, &C) -> Result<(), TaskDomainError>,
    {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut task = self.load(task_id).await?;
            change(&mut task, &*self.clock)?;
            match self.tasks.update(&task).await {
                Ok(stored) => return Ok(stored),
                Err(TaskRepositoryError::Conflict { .. }) => {}
                Err(err) => return Err(err.into()),
            }
        }
        Err(TaskLifecycleError::Contention(task_id))
    }

    async fn load(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }
}
