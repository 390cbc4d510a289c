//! Base58 public key addresses.

use super::WalletDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length in bytes of an ed25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Base58-encoded wallet public key.
///
/// Construction only rejects empty input. External keys are stored as the
/// user supplied them, so decoding is checked on use with [`Self::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Creates an address from a raw public key string.
    ///
    /// # Errors
    ///
    /// Returns [`WalletDomainError::EmptyAddress`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, WalletDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WalletDomainError::EmptyAddress);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Encodes raw public key bytes.
    #[must_use]
    pub fn from_public_key(bytes: &[u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bs58::encode(bytes).into_string())
    }

    /// Decodes the address into public key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WalletDomainError::InvalidAddress`] when the value is not
    /// base58 or does not decode to exactly 32 bytes.
    pub fn decode(&self) -> Result<[u8; PUBLIC_KEY_LEN], WalletDomainError> {
        let bytes = bs58::decode(&self.0)
            .into_vec()
            .map_err(|err| self.invalid(err.to_string()))?;
        <[u8; PUBLIC_KEY_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
            self.invalid(format!(
                "expected {PUBLIC_KEY_LEN} bytes, decoded {}",
                bytes.len()
            ))
        })
    }

    /// Returns `true` when the address decodes to a 32-byte public key.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.decode().is_ok()
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn invalid(&self, reason: String) -> WalletDomainError {
        WalletDomainError::InvalidAddress {
            address: self.0.clone(),
            reason,
        }
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
