//! Domain model for custodial and external wallets.

mod address;
mod error;
mod lamports;
mod wallet;

pub use address::{PUBLIC_KEY_LEN, WalletAddress};
pub use error::WalletDomainError;
pub use lamports::{LAMPORTS_PER_SOL, Lamports};
pub use wallet::{GeneratedKeypair, RecoveryPhrase, Wallet, WalletKind};
