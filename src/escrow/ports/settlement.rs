//! Settlement port for escrow deposits and releases.

use crate::escrow::domain::{EscrowRecord, SettlementReceipt};
use crate::task::domain::TaskId;
use crate::wallet::domain::{Lamports, WalletAddress};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for settlement operations.
pub type SettlementResult<T> = Result<T, SettlementError>;

/// Moves escrowed funds, or pretends to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EscrowSettlement: Send + Sync {
    /// Settles a deposit of `amount` from `from` into escrow for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError`] when the deposit cannot be settled.
    async fn deposit(
        &self,
        task_id: TaskId,
        from: &WalletAddress,
        amount: Lamports,
    ) -> SettlementResult<SettlementReceipt>;

    /// Settles the release of `escrow` for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError`] when the release cannot be settled.
    async fn release(
        &self,
        task_id: TaskId,
        escrow: &EscrowRecord,
    ) -> SettlementResult<SettlementReceipt>;
}

/// Errors returned by settlement adapters.
#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    /// The settlement backend refused the request.
    #[error("settlement rejected: {0}")]
    Rejected(String),

    /// The settlement backend could not be reached.
    #[error("settlement unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl SettlementError {
    /// Wraps a backend failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
