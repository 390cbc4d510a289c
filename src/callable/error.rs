//! Callable error codes and the mapping from service errors.

use crate::escrow::{domain::EscrowDomainError, ports::SettlementError, services::EscrowServiceError};
use crate::identity::{
    domain::IdentityDomainError, ports::ProfileRepositoryError, services::IdentityBindingError,
};
use crate::task::{
    domain::TaskDomainError, ports::TaskRepositoryError, services::TaskLifecycleError,
};
use crate::wallet::{
    domain::WalletDomainError, ports::KeygenError, services::WalletRegistryError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for callable endpoints.
pub type CallableResult<T> = Result<T, CallableError>;

/// Status code reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallableCode {
    /// No authenticated caller.
    Unauthenticated,
    /// The named procedure, profile, or task does not exist.
    NotFound,
    /// The target is not in a state that permits the call.
    FailedPrecondition,
    /// The payload is malformed or carries an invalid value.
    InvalidArgument,
    /// The backend failed.
    Internal,
}

impl CallableCode {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound => "not-found",
            Self::FailedPrecondition => "failed-precondition",
            Self::InvalidArgument => "invalid-argument",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for CallableCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a callable endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct CallableError {
    code: CallableCode,
    message: String,
}

impl CallableError {
    /// Creates an error with `code` and a caller-facing message.
    #[must_use]
    pub fn new(code: CallableCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Creates an `unauthenticated` error.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(CallableCode::Unauthenticated, message)
    }

    /// Creates a `not-found` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CallableCode::NotFound, message)
    }

    /// Creates an `invalid-argument` error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(CallableCode::InvalidArgument, message)
    }

    /// Creates an `internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CallableCode::Internal, message)
    }

    /// Returns the status code.
    #[must_use]
    pub const fn code(&self) -> CallableCode {
        self.code
    }

    /// Returns the caller-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that map onto exactly one [`CallableCode`].
pub(crate) trait ErrorCode {
    fn callable_code(&self) -> CallableCode;
}

impl ErrorCode for WalletDomainError {
    fn callable_code(&self) -> CallableCode {
        CallableCode::InvalidArgument
    }
}

impl ErrorCode for IdentityDomainError {
    fn callable_code(&self) -> CallableCode {
        match self {
            Self::EmptyUserId | Self::UserIdTooLong { .. } | Self::WalletKindMismatch(_) => {
                CallableCode::InvalidArgument
            }
            Self::NativeWalletAlreadyAttached(_) | Self::SelfReview(_) => {
                CallableCode::FailedPrecondition
            }
        }
    }
}

impl ErrorCode for ProfileRepositoryError {
    fn callable_code(&self) -> CallableCode {
        match self {
            Self::NotFound(_) => CallableCode::NotFound,
            Self::DuplicateProfile(_) | Self::Conflict { .. } => CallableCode::FailedPrecondition,
            Self::Persistence(_) => CallableCode::Internal,
        }
    }
}

impl ErrorCode for KeygenError {
    fn callable_code(&self) -> CallableCode {
        CallableCode::Internal
    }
}

impl ErrorCode for WalletRegistryError {
    fn callable_code(&self) -> CallableCode {
        match self {
            Self::Domain(err) => err.callable_code(),
            Self::Identity(err) => err.callable_code(),
            Self::Repository(err) => err.callable_code(),
            Self::Keygen(err) => err.callable_code(),
            Self::ProfileNotFound(_) => CallableCode::NotFound,
            Self::Contention(_) => CallableCode::FailedPrecondition,
        }
    }
}

impl ErrorCode for IdentityBindingError {
    fn callable_code(&self) -> CallableCode {
        match self {
            Self::Domain(err) => err.callable_code(),
            Self::Repository(err) => err.callable_code(),
            Self::Wallet(err) => err.callable_code(),
            Self::ProfileNotFound(_) => CallableCode::NotFound,
            Self::Contention(_) => CallableCode::FailedPrecondition,
        }
    }
}

impl ErrorCode for EscrowDomainError {
    fn callable_code(&self) -> CallableCode {
        match self {
            Self::EmptyTransactionId => CallableCode::Internal,
            Self::AlreadyReleased => CallableCode::FailedPrecondition,
            Self::ZeroAmount => CallableCode::InvalidArgument,
        }
    }
}

impl ErrorCode for TaskDomainError {
    fn callable_code(&self) -> CallableCode {
        match self {
            Self::EmptyTitle
            | Self::TitleTooLong { .. }
            | Self::ZeroDeposit
            | Self::EmptyMessage => {
                CallableCode::InvalidArgument
            }
            Self::InvalidTransition { .. }
            | Self::SelfAcceptance(_)
            | Self::NotParticipant { .. }
            | Self::EscrowAlreadyExists(_)
            | Self::NoEscrow(_) => CallableCode::FailedPrecondition,
            Self::Escrow { source, .. } => source.callable_code(),
        }
    }
}

impl ErrorCode for TaskRepositoryError {
    fn callable_code(&self) -> CallableCode {
        match self {
            Self::NotFound(_) => CallableCode::NotFound,
            Self::Conflict { .. } => CallableCode::FailedPrecondition,
            Self::DuplicateTask(_) | Self::Persistence(_) => CallableCode::Internal,
        }
    }
}

impl ErrorCode for SettlementError {
    fn callable_code(&self) -> CallableCode {
        match self {
            Self::Rejected(_) => CallableCode::FailedPrecondition,
            Self::Unavailable(_) => CallableCode::Internal,
        }
    }
}

impl ErrorCode for EscrowServiceError {
    fn callable_code(&self) -> CallableCode {
        match self {
            Self::Wallet(err) => err.callable_code(),
            Self::Escrow(err) => err.callable_code(),
            Self::Task(err) => err.callable_code(),
            Self::Repository(err) => err.callable_code(),
            Self::Settlement(err) => err.callable_code(),
            Self::TaskNotFound(_) => CallableCode::NotFound,
            Self::Contention(_) => CallableCode::FailedPrecondition,
        }
    }
}

impl ErrorCode for TaskLifecycleError {
    fn callable_code(&self) -> CallableCode {
        match self {
            Self::Domain(err) => err.callable_code(),
            Self::Repository(err) => err.callable_code(),
            Self::Escrow(err) => err.callable_code(),
            Self::NotFound(_) => CallableCode::NotFound,
            Self::Contention(_) => CallableCode::FailedPrecondition,
        }
    }
}

macro_rules! callable_from {
    ($($source:ty),+ $(,)?) => {$(
        impl From<$source> for CallableError {
            fn from(err: $source) -> Self {
                Self::new(err.callable_code(), err.to_string())
            }
        }
    )+};
}

callable_from!(
    WalletDomainError,
    IdentityDomainError,
    WalletRegistryError,
    IdentityBindingError,
    TaskDomainError,
    TaskRepositoryError,
    EscrowServiceError,
    TaskLifecycleError,
);
