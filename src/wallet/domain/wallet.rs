//! Wallet value objects embedded in user profiles.

use super::{Lamports, WalletAddress, WalletDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distinguishes custodially generated wallets from user-supplied ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    /// Keypair generated and held by the marketplace.
    Native,
    /// Public key supplied by the user; no keys are held.
    External,
}

impl WalletKind {
    /// Returns `true` for [`WalletKind::Native`].
    #[must_use]
    pub const fn is_native(self) -> bool {
        matches!(self, Self::Native)
    }
}

/// Secret material shown to the owner of a native wallet exactly once.
///
/// The phrase is the base58 encoding of the 64-byte ed25519 keypair. It is
/// never persisted and its `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct RecoveryPhrase(String);

impl RecoveryPhrase {
    /// Wraps an encoded recovery phrase.
    ///
    /// # Errors
    ///
    /// Returns [`WalletDomainError::EmptyRecoveryPhrase`] for empty input.
    pub fn new(value: impl Into<String>) -> Result<Self, WalletDomainError> {
        let phrase = value.into();
        if phrase.is_empty() {
            return Err(WalletDomainError::EmptyRecoveryPhrase);
        }
        Ok(Self(phrase))
    }

    /// Exposes the phrase for one-time display to its owner.
    #[must_use]
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecoveryPhrase(<redacted>)")
    }
}

/// A wallet attached to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    address: WalletAddress,
    kind: WalletKind,
    balance: Option<Lamports>,
    #[serde(skip)]
    recovery_phrase: Option<RecoveryPhrase>,
}

impl Wallet {
    /// Creates a native wallet carrying its one-time recovery phrase.
    #[must_use]
    pub const fn native(address: WalletAddress, recovery_phrase: RecoveryPhrase) -> Self {
        Self {
            address,
            kind: WalletKind::Native,
            balance: None,
            recovery_phrase: Some(recovery_phrase),
        }
    }

    /// Creates an external wallet from a user-supplied public key.
    #[must_use]
    pub const fn external(address: WalletAddress) -> Self {
        Self {
            address,
            kind: WalletKind::External,
            balance: None,
            recovery_phrase: None,
        }
    }

    /// Returns the wallet public key.
    #[must_use]
    pub const fn address(&self) -> &WalletAddress {
        &self.address
    }

    /// Returns the wallet kind.
    #[must_use]
    pub const fn kind(&self) -> WalletKind {
        self.kind
    }

    /// Returns `true` for custodially generated wallets.
    #[must_use]
    pub const fn is_native(&self) -> bool {
        self.kind.is_native()
    }

    /// Returns the last fetched balance, if any.
    #[must_use]
    pub const fn balance(&self) -> Option<Lamports> {
        self.balance
    }

    /// Returns the recovery phrase while it is still held in memory.
    #[must_use]
    pub const fn recovery_phrase(&self) -> Option<&RecoveryPhrase> {
        self.recovery_phrase.as_ref()
    }

    /// Records a freshly fetched balance.
    #[must_use]
    pub fn with_balance(mut self, balance: Lamports) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Drops the recovery phrase, returning the persistable wallet.
    #[must_use]
    pub fn without_recovery_phrase(mut self) -> Self {
        self.recovery_phrase = None;
        self
    }
}

/// A freshly generated custodial keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKeypair {
    /// Public key of the generated keypair.
    pub address: WalletAddress,
    /// Encoded secret for one-time display.
    pub recovery_phrase: RecoveryPhrase,
}

impl GeneratedKeypair {
    /// Converts the keypair into a native wallet.
    #[must_use]
    pub fn into_wallet(self) -> Wallet {
        Wallet::native(self.address, self.recovery_phrase)
    }
}
