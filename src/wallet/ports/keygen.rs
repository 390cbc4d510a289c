//! Custodial keypair generation port.

use crate::wallet::domain::GeneratedKeypair;
use std::sync::Arc;
use thiserror::Error;

/// Generates keypairs for native wallets.
pub trait KeypairGenerator: Send + Sync {
    /// Generates a fresh keypair.
    ///
    /// # Errors
    ///
    /// Returns [`KeygenError`] when the entropy source or encoding fails.
    fn generate(&self) -> Result<GeneratedKeypair, KeygenError>;
}

/// Errors returned by keypair generators.
#[derive(Debug, Clone, Error)]
#[error("keypair generation failed: {0}")]
pub struct KeygenError(pub Arc<dyn std::error::Error + Send + Sync>);

impl KeygenError {
    /// Wraps an underlying generator error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
