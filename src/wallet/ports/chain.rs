//! Chain balance port.

use crate::wallet::domain::{Lamports, WalletAddress, WalletDomainError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for chain balance lookups.
pub type ChainResult<T> = Result<T, ChainError>;

/// Read-only balance lookups against a blockchain RPC endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainBalanceSource: Send + Sync {
    /// Returns the lamport balance held by `address`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidAddress`] when the address does not
    /// decode, or [`ChainError::Rpc`] / [`ChainError::Transport`] when the
    /// endpoint rejects or fails the request.
    async fn balance(&self, address: &WalletAddress) -> ChainResult<Lamports>;
}

/// Errors returned by chain balance adapters.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// The address is not a valid public key.
    #[error(transparent)]
    InvalidAddress(#[from] WalletDomainError),

    /// The RPC endpoint returned a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// The response could not be interpreted.
    #[error("malformed rpc response: {0}")]
    MalformedResponse(String),

    /// Network or transport failure.
    #[error("rpc transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl ChainError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
