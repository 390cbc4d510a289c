//! Service layer for escrow deposits, transfers, and releases.

use crate::escrow::{
    domain::{EscrowDomainError, EscrowRecord, SettlementReceipt},
    ports::{EscrowSettlement, SettlementError},
};
use crate::identity::domain::UserId;
use crate::task::{
    domain::{Task, TaskDomainError, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
};
use crate::wallet::domain::{Lamports, WalletAddress, WalletDomainError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

const MAX_WRITE_ATTEMPTS: usize = 5;

/// Service-level errors for escrow operations.
#[derive(Debug, Error)]
pub enum EscrowServiceError {
    /// The payer key or amount is invalid.
    #[error(transparent)]
    Wallet(#[from] WalletDomainError),
    /// The escrow record rejected the change.
    #[error(transparent)]
    Escrow(#[from] EscrowDomainError),
    /// The task rejected the change.
    #[error(transparent)]
    Task(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The settlement adapter failed.
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// Concurrent writers kept winning the task update.
    #[error("task {0} is under heavy concurrent modification")]
    Contention(TaskId),
}

/// Result type for escrow service operations.
pub type EscrowServiceResult<T> = Result<T, EscrowServiceError>;

/// Request parameters for an escrow deposit.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRequest {
    caller: UserId,
    task_id: TaskId,
    from_pubkey: String,
    amount_sol: f64,
}

impl DepositRequest {
    /// Creates a deposit request from `caller` for `task_id`.
    #[must_use]
    pub fn new(
        caller: UserId,
        task_id: TaskId,
        from_pubkey: impl Into<String>,
        amount_sol: f64,
    ) -> Self {
        Self {
            caller,
            task_id,
            from_pubkey: from_pubkey.into(),
            amount_sol,
        }
    }
}

/// Result of a recorded deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOutcome {
    /// The task with its funded escrow.
    pub task: Task,
    /// Deposit settlement receipt.
    pub receipt: SettlementReceipt,
    /// Payer balance after the deposit. Always zero: balances are read from
    /// the chain, never derived from escrow.
    pub new_balance: Lamports,
}

/// Result of a settled release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// The task with its released escrow.
    pub task: Task,
    /// Release settlement receipt.
    pub receipt: SettlementReceipt,
}

/// Escrow orchestration service.
pub struct EscrowService<R, S, C>
where
    R: TaskRepository,
    S: EscrowSettlement,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    settlement: Arc<S>,
    clock: Arc<C>,
}

impl<R, S, C> Clone for EscrowService<R, S, C>
where
    R: TaskRepository,
    S: EscrowSettlement,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            settlement: Arc::clone(&self.settlement),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, S, C> EscrowService<R, S, C>
where
    R: TaskRepository,
    S: EscrowSettlement,
    C: Clock + Send + Sync,
{
    /// Creates a new escrow service.
    #[must_use]
    pub const fn new(tasks: Arc<R>, settlement: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            settlement,
            clock,
        }
    }

    /// Records a funded escrow on a task.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowServiceError::TaskNotFound`] for a missing task,
    /// [`EscrowServiceError::Wallet`] or [`EscrowServiceError::Escrow`] for a
    /// bad key or amount, and [`TaskDomainError::EscrowAlreadyExists`] when
    /// the task already has an escrow.
    pub async fn deposit_to_escrow(
        &self,
        request: DepositRequest,
    ) -> EscrowServiceResult<DepositOutcome> {
        let DepositRequest {
            caller,
            task_id,
            from_pubkey,
            amount_sol,
        } = request;
        let from = WalletAddress::new(from_pubkey)?;
        from.decode()?;
        let amount = Lamports::from_sol(amount_sol)?;
        if amount.is_zero() {
            return Err(EscrowDomainError::ZeroAmount.into());
        }

        let mut receipt: Option<SettlementReceipt> = None;
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut task = self.load(task_id).await?;
            if task.escrow().is_some() {
                return Err(TaskDomainError::EscrowAlreadyExists(task_id).into());
            }
            let settled = match receipt.take() {
                Some(existing) => existing,
                None => self.settlement.deposit(task_id, &from, amount).await?,
            };
            let record = EscrowRecord::funded(
                settled.clone(),
                from.clone(),
                caller.clone(),
                amount,
                &*self.clock,
            )?;
            task.attach_escrow(record, &*self.clock)?;
            match self.tasks.update(&task).await {
                Ok(stored) => {
                    info!(
                        %task_id,
                        tx_id = %settled.tx_id,
                        verification = settled.verification.as_str(),
                        lamports = amount.value(),
                        "escrow funded"
                    );
                    return Ok(DepositOutcome {
                        task: stored,
                        receipt: settled,
                        new_balance: Lamports::ZERO,
                    });
                }
                Err(TaskRepositoryError::Conflict { .. }) => receipt = Some(settled),
                Err(err) => return Err(err.into()),
            }
        }
        Err(EscrowServiceError::Contention(task_id))
    }

    /// Releases the task's escrow and completes the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NoEscrow`] when no escrow exists,
    /// [`TaskDomainError::Escrow`] when it was already released,
    /// [`TaskDomainError::InvalidTransition`] when the task cannot complete,
    /// or [`EscrowServiceError::Settlement`] when the settlement fails.
    pub async fn transfer_for_task(&self, task_id: TaskId) -> EscrowServiceResult<ReleaseOutcome> {
        self.settle_release(task_id, true).await
    }

    /// Releases the task's escrow without changing task status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NoEscrow`] when no escrow exists,
    /// [`TaskDomainError::Escrow`] when it was already released, or
    /// [`EscrowServiceError::Settlement`] when the settlement fails.
    pub async fn release_escrow(&self, task_id: TaskId) -> EscrowServiceResult<ReleaseOutcome> {
        self.settle_release(task_id, false).await
    }

    async fn settle_release(
        &self,
        task_id: TaskId,
        complete: bool,
    ) -> EscrowServiceResult<ReleaseOutcome> {
        let mut receipt: Option<SettlementReceipt> = None;
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut task = self.load(task_id).await?;
            let escrow = funded_escrow(&task)?;
            if complete {
                task.ensure_transition(TaskStatus::Completed)?;
            }
            let settled = match receipt.take() {
                Some(existing) => existing,
                None => self.settlement.release(task_id, escrow).await?,
            };

            task.release_escrow(settled.clone(), &*self.clock)?;
            if complete {
                task.transition_to(TaskStatus::Completed, &*self.clock)?;
            }
            match self.tasks.update(&task).await {
                Ok(stored) => {
                    info!(
                        %task_id,
                        tx_id = %settled.tx_id,
                        verification = settled.verification.as_str(),
                        completed = complete,
                        "escrow released"
                    );
                    return Ok(ReleaseOutcome {
                        task: stored,
                        receipt: settled,
                    });
                }
                Err(TaskRepositoryError::Conflict { .. }) => receipt = Some(settled),
                Err(err) => return Err(err.into()),
            }
        }
        Err(EscrowServiceError::Contention(task_id))
    }

    async fn load(&self, task_id: TaskId) -> EscrowServiceResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(EscrowServiceError::TaskNotFound(task_id))
    }
}

fn funded_escrow(task: &Task) -> Result<&EscrowRecord, TaskDomainError> {
    let escrow = task.escrow().ok_or(TaskDomainError::NoEscrow(task.id()))?;
    if escrow.is_funded() {
        Ok(escrow)
    } else {
        Err(TaskDomainError::Escrow {
            task_id: task.id(),
            source: EscrowDomainError::AlreadyReleased,
        })
    }
}
