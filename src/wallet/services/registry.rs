//! Service layer for native wallet generation, external wallet connection,
//! and balance refresh.

use crate::identity::{
    domain::{IdentityDomainError, Profile, UserId},
    ports::{ProfileRepository, ProfileRepositoryError},
};
use crate::wallet::{
    domain::{Lamports, Wallet, WalletAddress, WalletDomainError},
    ports::{ChainBalanceSource, KeygenError, KeypairGenerator},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Upper bound on read-modify-write attempts against a contended profile.
const MAX_WRITE_ATTEMPTS: usize = 5;

/// Service-level errors for wallet registry operations.
#[derive(Debug, Error)]
pub enum WalletRegistryError {
    /// Wallet input validation failed.
    #[error(transparent)]
    Domain(#[from] WalletDomainError),
    /// Profile mutation was rejected.
    #[error(transparent)]
    Identity(#[from] IdentityDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProfileRepositoryError),
    /// Keypair generation failed.
    #[error(transparent)]
    Keygen(#[from] KeygenError),
    /// No profile exists for the user.
    #[error("profile not found: {0}")]
    ProfileNotFound(UserId),
    /// Concurrent writers kept winning the profile update.
    #[error("profile {0} is under heavy concurrent modification")]
    Contention(UserId),
}

/// Result type for wallet registry operations.
pub type WalletRegistryResult<T> = Result<T, WalletRegistryError>;

/// Outcome of a native wallet request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeWalletOutcome {
    /// The profile's native wallet. Carries its recovery phrase only when
    /// it was generated by this call.
    pub wallet: Wallet,
    /// `true` when this call generated the wallet.
    pub generated: bool,
}

/// Native and external wallets with freshly fetched balances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletBalances {
    /// Native wallet, if the profile has one.
    pub native_wallet: Option<Wallet>,
    /// External wallets in connection order.
    pub external_wallets: Vec<Wallet>,
}

/// Wallet registry orchestration service.
pub struct WalletRegistryService<P, B, K, C>
where
    P: ProfileRepository,
    B: ChainBalanceSource,
    K: KeypairGenerator,
    C: Clock + Send + Sync,
{
    profiles: Arc<P>,
    chain: Arc<B>,
    keygen: Arc<K>,
    clock: Arc<C>,
}

impl<P, B, K, C> Clone for WalletRegistryService<P, B, K, C>
where
    P: ProfileRepository,
    B: ChainBalanceSource,
    K: KeypairGenerator,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            profiles: Arc::clone(&self.profiles),
            chain: Arc::clone(&self.chain),
            keygen: Arc::clone(&self.keygen),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, B, K, C> WalletRegistryService<P, B, K, C>
where
    P: ProfileRepository,
    B: ChainBalanceSource,
    K: KeypairGenerator,
    C: Clock + Send + Sync,
{
    /// Creates a new wallet registry service.
    #[must_use]
    pub const fn new(profiles: Arc<P>, chain: Arc<B>, keygen: Arc<K>, clock: Arc<C>) -> Self {
        Self {
            profiles,
            chain,
            keygen,
            clock,
        }
    }

    /// Returns the profile's native wallet, generating and attaching one if
    /// none exists.
    ///
    /// When overlapping calls race, exactly one attach wins; the others
    /// observe the revision conflict, reload, and return the winner's
    /// wallet without a recovery phrase.
    ///
    /// # Errors
    ///
    /// Returns [`WalletRegistryError::ProfileNotFound`] when the user has no
    /// profile, [`WalletRegistryError::Keygen`] when key generation fails, or
    /// [`WalletRegistryError::Repository`] on persistence failure.
    pub async fn generate_native_wallet(
        &self,
        user_id: &UserId,
    ) -> WalletRegistryResult<NativeWalletOutcome> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut profile = self.load(user_id).await?;
            if let Some(existing) = profile.native_wallet() {
                debug!(user = %user_id, address = %existing.address(), "native wallet already attached");
                return Ok(NativeWalletOutcome {
                    wallet: existing.clone(),
                    generated: false,
                });
            }

            let wallet = self.keygen.generate()?.into_wallet().with_balance(Lamports::ZERO);
            profile.attach_native_wallet(wallet.clone(), &*self.clock)?;
            match self.profiles.update(&profile).await {
                Ok(_) => {
                    info!(user = %user_id, address = %wallet.address(), "attached native wallet");
                    return Ok(NativeWalletOutcome {
                        wallet,
                        generated: true,
                    });
                }
                Err(ProfileRepositoryError::Conflict { .. }) => {
                    debug!(user = %user_id, "native wallet attach lost a race, reloading");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(WalletRegistryError::Contention(user_id.clone()))
    }

    /// Connects a user-supplied public key as an external wallet.
    ///
    /// An undecodable key or an RPC failure degrades the balance to zero
    /// and logs a warning; the key is appended either way.
    ///
    /// # Errors
    ///
    /// Returns [`WalletRegistryError::Domain`] when the key is empty,
    /// [`WalletRegistryError::ProfileNotFound`] when the user has no
    /// profile, or [`WalletRegistryError::Repository`] on persistence failure.
    pub async fn connect_external_wallet(
        &self,
        user_id: &UserId,
        pubkey: &str,
    ) -> WalletRegistryResult<Wallet> {
        let address = WalletAddress::new(pubkey)?;
        let balance = self.balance_or_zero(&address).await;
        let wallet = Wallet::external(address).with_balance(balance);

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut profile = self.load(user_id).await?;
            profile.add_external_wallet(wallet.clone(), &*self.clock)?;
            match self.profiles.update(&profile).await {
                Ok(_) => {
                    info!(user = %user_id, address = %wallet.address(), "connected external wallet");
                    return Ok(wallet);
                }
                Err(ProfileRepositoryError::Conflict { .. }) => {}
                Err(err) => return Err(err.into()),
            }
        }
        Err(WalletRegistryError::Contention(user_id.clone()))
    }

    /// Refreshes and returns balances for every wallet on the profile.
    ///
    /// Individual lookups that fail report zero. The refreshed balances are
    /// written back best-effort; a failed write is logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`WalletRegistryError::ProfileNotFound`] when the user has no
    /// profile, or [`WalletRegistryError::Repository`] when the profile read
    /// fails.
    pub async fn fetch_balances(&self, user_id: &UserId) -> WalletRegistryResult<WalletBalances> {
        let mut profile = self.load(user_id).await?;

        let mut balances = Vec::new();
        for address in profile.wallet_addresses() {
            let balance = self.balance_or_zero(&address).await;
            balances.push((address, balance));
        }
        profile.apply_balances(&balances, &*self.clock);

        if let Err(err) = self.profiles.update(&profile).await {
            warn!(user = %user_id, error = %err, "failed to persist refreshed balances");
        }

        Ok(WalletBalances {
            native_wallet: profile.native_wallet().cloned(),
            external_wallets: profile.external_wallets().to_vec(),
        })
    }

    /// Fetches the balance of a single address, degrading to zero.
    pub async fn refresh(&self, address: &WalletAddress) -> Lamports {
        self.balance_or_zero(address).await
    }

    async fn balance_or_zero(&self, address: &WalletAddress) -> Lamports {
        match self.chain.balance(address).await {
            Ok(balance) => balance,
            Err(err) => {
                warn!(%address, error = %err, "balance lookup failed, reporting zero");
                Lamports::ZERO
            }
        }
    }

    async fn load(&self, user_id: &UserId) -> WalletRegistryResult<Profile> {
        self.profiles
            .find(user_id)
            .await?
            .ok_or_else(|| WalletRegistryError::ProfileNotFound(user_id.clone()))
    }
}
