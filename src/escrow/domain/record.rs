//! Escrow record embedded on a task.

use super::{EscrowDomainError, TransactionId};
use crate::identity::domain::UserId;
use crate::wallet::domain::{Lamports, WalletAddress};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Escrow lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowState {
    /// Deposit recorded, awaiting release.
    Funded,
    /// Deposit released to the recipient.
    Released,
}

impl EscrowState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Funded => "funded",
            Self::Released => "released",
        }
    }
}

/// How far a settlement can be trusted.
///
/// Simulated settlements never touch a chain. Unverified marks a release
/// whose settlement attempt failed and was recorded anyway so the task
/// could complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementVerification {
    /// Produced by a simulator.
    Simulated,
    /// Confirmed on chain.
    Confirmed,
    /// Settlement failed; outcome recorded without confirmation.
    Unverified,
}

impl SettlementVerification {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::Confirmed => "confirmed",
            Self::Unverified => "unverified",
        }
    }
}

/// Receipt returned by a settlement adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    /// Settlement transaction identifier.
    pub tx_id: TransactionId,
    /// Trust level of the settlement.
    pub verification: SettlementVerification,
}

/// Escrow record for a single task deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRecord {
    tx_id: TransactionId,
    from: WalletAddress,
    to: UserId,
    amount: Lamports,
    state: EscrowState,
    verification: SettlementVerification,
    release_tx_id: Option<TransactionId>,
    failure_note: Option<String>,
    funded_at: DateTime<Utc>,
    released_at: Option<DateTime<Utc>>,
}

impl EscrowRecord {
    /// Records a funded escrow from a deposit receipt.
    ///
    /// `to` is the user who made the deposit.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowDomainError::ZeroAmount`] for a zero deposit.
    pub fn funded(
        receipt: SettlementReceipt,
        from: WalletAddress,
        to: UserId,
        amount: Lamports,
        clock: &impl Clock,
    ) -> Result<Self, EscrowDomainError> {
        if amount.is_zero() {
            return Err(EscrowDomainError::ZeroAmount);
        }
        Ok(Self {
            tx_id: receipt.tx_id,
            from,
            to,
            amount,
            state: EscrowState::Funded,
            verification: receipt.verification,
            release_tx_id: None,
            failure_note: None,
            funded_at: clock.utc(),
            released_at: None,
        })
    }

    /// Returns the deposit transaction identifier.
    #[must_use]
    pub const fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    /// Returns the paying wallet.
    #[must_use]
    pub const fn from(&self) -> &WalletAddress {
        &self.from
    }

    /// Returns the depositing user.
    #[must_use]
    pub const fn to(&self) -> &UserId {
        &self.to
    }

    /// Returns the escrowed amount.
    #[must_use]
    pub const fn amount(&self) -> Lamports {
        self.amount
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EscrowState {
        self.state
    }

    /// Returns the trust level of the latest settlement.
    #[must_use]
    pub const fn verification(&self) -> SettlementVerification {
        self.verification
    }

    /// Returns the release transaction identifier, if released with one.
    #[must_use]
    pub const fn release_tx_id(&self) -> Option<&TransactionId> {
        self.release_tx_id.as_ref()
    }

    /// Returns the recorded settlement failure, if any.
    #[must_use]
    pub fn failure_note(&self) -> Option<&str> {
        self.failure_note.as_deref()
    }

    /// Returns when the deposit was recorded.
    #[must_use]
    pub const fn funded_at(&self) -> DateTime<Utc> {
        self.funded_at
    }

    /// Returns when the escrow was released.
    #[must_use]
    pub const fn released_at(&self) -> Option<DateTime<Utc>> {
        self.released_at
    }

    /// Returns `true` while the deposit awaits release.
    #[must_use]
    pub const fn is_funded(&self) -> bool {
        matches!(self.state, EscrowState::Funded)
    }

    /// Marks the escrow released by a settlement receipt.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowDomainError::AlreadyReleased`] when already released.
    pub fn release(
        &mut self,
        receipt: SettlementReceipt,
        clock: &impl Clock,
    ) -> Result<(), EscrowDomainError> {
        self.ensure_funded()?;
        self.state = EscrowState::Released;
        self.verification = receipt.verification;
        self.release_tx_id = Some(receipt.tx_id);
        self.released_at = Some(clock.utc());
        Ok(())
    }

    /// Marks the escrow released without a settlement, recording why the
    /// settlement failed.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowDomainError::AlreadyReleased`] when already released.
    pub fn release_unverified(
        &mut self,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), EscrowDomainError> {
        self.ensure_funded()?;
        self.state = EscrowState::Released;
        self.verification = SettlementVerification::Unverified;
        self.failure_note = Some(reason.into());
        self.released_at = Some(clock.utc());
        Ok(())
    }

    const fn ensure_funded(&self) -> Result<(), EscrowDomainError> {
        if self.is_funded() {
            Ok(())
        } else {
            Err(EscrowDomainError::AlreadyReleased)
        }
    }
}
