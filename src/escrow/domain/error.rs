//! Error types for escrow domain validation.

use thiserror::Error;

/// Errors returned while constructing or mutating escrow records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EscrowDomainError {
    /// A transaction identifier is empty after trimming.
    #[error("transaction id must not be empty")]
    EmptyTransactionId,

    /// The escrow has already been released.
    #[error("escrow already released")]
    AlreadyReleased,

    /// The escrow amount is zero.
    #[error("escrow amount must be greater than zero")]
    ZeroAmount,
}
