//! Settlement adapter that fails on demand.

use super::SimulatedSettlement;
use crate::escrow::{
    domain::{EscrowRecord, SettlementReceipt},
    ports::{EscrowSettlement, SettlementError, SettlementResult},
};
use crate::task::domain::TaskId;
use crate::wallet::domain::{Lamports, WalletAddress};
use async_trait::async_trait;

/// Settlement adapter that rejects releases, and optionally deposits, with a
/// fixed reason. Calls it does not reject are simulated.
#[derive(Debug, Clone)]
pub struct FailingSettlement {
    simulator: SimulatedSettlement,
    reason: String,
    fail_deposits: bool,
}

impl FailingSettlement {
    /// Rejects every deposit and release.
    #[must_use]
    pub fn always(reason: impl Into<String>) -> Self {
        Self {
            simulator: SimulatedSettlement::new(),
            reason: reason.into(),
            fail_deposits: true,
        }
    }

    /// Simulates deposits and rejects releases.
    #[must_use]
    pub fn on_release(reason: impl Into<String>) -> Self {
        Self {
            fail_deposits: false,
            ..Self::always(reason)
        }
    }

    fn rejection(&self) -> SettlementError {
        SettlementError::Rejected(self.reason.clone())
    }
}

#[async_trait]
impl EscrowSettlement for FailingSettlement {
    async fn deposit(
        &self,
        task_id: TaskId,
        from: &WalletAddress,
        amount: Lamports,
    ) -> SettlementResult<SettlementReceipt> {
        if self.fail_deposits {
            return Err(self.rejection());
        }
        self.simulator.deposit(task_id, from, amount).await
    }

    async fn release(
        &self,
        _task_id: TaskId,
        _escrow: &EscrowRecord,
    ) -> SettlementResult<SettlementReceipt> {
        Err(self.rejection())
    }
}
