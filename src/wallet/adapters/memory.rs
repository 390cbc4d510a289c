//! In-memory chain ledger for tests and offline runs.

use crate::wallet::{
    domain::{Lamports, WalletAddress},
    ports::{ChainBalanceSource, ChainError, ChainResult},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Fixed balance table standing in for an RPC endpoint.
///
/// Unknown addresses report zero, as an unfunded account does on chain.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<WalletAddress, Lamports>,
    unavailable: HashSet<WalletAddress>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the balance reported for `address`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Transport`] when lock acquisition fails.
    pub fn set_balance(&self, address: WalletAddress, balance: Lamports) -> ChainResult<()> {
        let mut state = self.write()?;
        state.unavailable.remove(&address);
        state.balances.insert(address, balance);
        Ok(())
    }

    /// Makes lookups for `address` fail as if the endpoint were down.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Transport`] when lock acquisition fails.
    pub fn set_unavailable(&self, address: WalletAddress) -> ChainResult<()> {
        self.write()?.unavailable.insert(address);
        Ok(())
    }

    fn write(&self) -> ChainResult<std::sync::RwLockWriteGuard<'_, LedgerState>> {
        self.state
            .write()
            .map_err(|err| ChainError::transport(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl ChainBalanceSource for InMemoryLedger {
    async fn balance(&self, address: &WalletAddress) -> ChainResult<Lamports> {
        address.decode()?;
        let state = self
            .state
            .read()
            .map_err(|err| ChainError::transport(std::io::Error::other(err.to_string())))?;
        if state.unavailable.contains(address) {
            return Err(ChainError::transport(std::io::Error::other(format!(
                "ledger unavailable for {address}"
            ))));
        }
        Ok(state.balances.get(address).copied().unwrap_or_default())
    }
}
