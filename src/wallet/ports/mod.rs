//! Port contracts for wallet key generation and balance lookups.

pub mod chain;
pub mod keygen;

pub use chain::{ChainBalanceSource, ChainError, ChainResult};
pub use keygen::{KeygenError, KeypairGenerator};

#[cfg(test)]
pub use chain::MockChainBalanceSource;
