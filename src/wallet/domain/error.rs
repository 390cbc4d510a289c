//! Error types for wallet domain validation.

use thiserror::Error;

/// Errors returned while constructing wallet domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletDomainError {
    /// The public key string is empty after trimming.
    #[error("wallet public key must not be empty")]
    EmptyAddress,

    /// The public key is not a base58-encoded 32-byte key.
    #[error("invalid wallet public key '{address}': {reason}")]
    InvalidAddress {
        /// Address as supplied.
        address: String,
        /// Decoder diagnostic.
        reason: String,
    },

    /// The SOL amount is negative, not finite, or out of range.
    #[error("invalid SOL amount: {0}")]
    InvalidAmount(String),

    /// The recovery phrase is empty.
    #[error("recovery phrase must not be empty")]
    EmptyRecoveryPhrase,
}
