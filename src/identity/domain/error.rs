//! Error types for identity domain validation and parsing.

use super::UserId;
use thiserror::Error;

/// Errors returned while constructing or mutating profiles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The identity-provider id is empty after trimming.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// The identity-provider id is longer than storage accepts.
    #[error("user id must be at most {max} characters")]
    UserIdTooLong {
        /// Character limit.
        max: usize,
    },

    /// The profile already carries a native wallet.
    #[error("profile {0} already has a native wallet")]
    NativeWalletAlreadyAttached(UserId),

    /// An external wallet was offered where a native one is required, or
    /// the reverse.
    #[error("wallet kind mismatch for profile {0}")]
    WalletKindMismatch(UserId),

    /// A user attempted to review themselves.
    #[error("user {0} cannot review themselves")]
    SelfReview(UserId),
}

/// Error returned while parsing enumerated identity values from storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseIdentityValueError {
    /// Enumeration being parsed.
    pub kind: &'static str,
    /// Offending value.
    pub value: String,
}
