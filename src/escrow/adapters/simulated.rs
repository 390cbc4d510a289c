//! Settlement simulator.

use crate::escrow::{
    domain::{EscrowRecord, SettlementReceipt, SettlementVerification, TransactionId},
    ports::{EscrowSettlement, SettlementError, SettlementResult},
};
use crate::task::domain::TaskId;
use crate::wallet::domain::{Lamports, WalletAddress};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Settlement adapter that moves nothing and tags every receipt
/// [`SettlementVerification::Simulated`].
///
/// Transaction ids are `base58(sha256(kind ‖ task id ‖ nonce))`, so they
/// are unique per call but carry no on-chain meaning.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSettlement {
    nonce: Arc<AtomicU64>,
}

impl SimulatedSettlement {
    /// Creates a simulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn receipt(&self, kind: &str, task_id: TaskId) -> SettlementResult<SettlementReceipt> {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Sha256::new();
        hasher.update(kind.as_bytes());
        hasher.update(task_id.into_inner().as_bytes());
        hasher.update(nonce.to_be_bytes());
        let tx_id = TransactionId::new(bs58::encode(hasher.finalize()).into_string())
            .map_err(|err| SettlementError::Rejected(err.to_string()))?;
        debug!(%task_id, kind, %tx_id, "simulated settlement");
        Ok(SettlementReceipt {
            tx_id,
            verification: SettlementVerification::Simulated,
        })
    }
}

#[async_trait]
impl EscrowSettlement for SimulatedSettlement {
    async fn deposit(
        &self,
        task_id: TaskId,
        _from: &WalletAddress,
        _amount: Lamports,
    ) -> SettlementResult<SettlementReceipt> {
        self.receipt("deposit", task_id)
    }

    async fn release(
        &self,
        task_id: TaskId,
        _escrow: &EscrowRecord,
    ) -> SettlementResult<SettlementReceipt> {
        self.receipt("release", task_id)
    }
}
