//! Ed25519 keypair generator for native wallets.

use crate::wallet::{
    domain::{GeneratedKeypair, RecoveryPhrase, WalletAddress},
    ports::{KeygenError, KeypairGenerator},
};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

/// Generates Solana-compatible ed25519 keypairs from the OS entropy source.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519KeypairGenerator;

impl Ed25519KeypairGenerator {
    /// Creates a generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl KeypairGenerator for Ed25519KeypairGenerator {
    fn generate(&self) -> Result<GeneratedKeypair, KeygenError> {
        let signing_key = SigningKey::generate(&mut OsRng);
        let public_key = signing_key.verifying_key().to_bytes();

        // 64-byte secret ‖ public layout, the form Solana tooling imports.
        let recovery_phrase =
            RecoveryPhrase::new(bs58::encode(signing_key.to_keypair_bytes()).into_string())
                .map_err(KeygenError::new)?;

        Ok(GeneratedKeypair {
            address: WalletAddress::from_public_key(&public_key),
            recovery_phrase,
        })
    }
}
