//! Shared helpers for marketplace integration tests.

use std::sync::Arc;
use std::time::Duration;

use kaam_connect::callable::{CallerContext, MarketplaceApi};
use kaam_connect::escrow::adapters::SimulatedSettlement;
use kaam_connect::identity::{adapters::memory::InMemoryProfileRepository, domain::UserId};
use kaam_connect::task::adapters::{
    memory::{InMemoryTaskMessageRepository, InMemoryTaskRepository},
    observed::ObservedTaskRepository,
};
use kaam_connect::wallet::adapters::{
    ed25519::Ed25519KeypairGenerator,
    solana_rpc::{Commitment, SolanaRpcClient, SolanaRpcConfig},
};
use mockable::DefaultClock;

/// Base58 key of the system program, a valid 32-byte address.
pub const PAYER: &str = "11111111111111111111111111111111";

/// Observed in-memory task storage.
pub type Tasks = ObservedTaskRepository<InMemoryTaskRepository>;

/// Callable surface reading balances over JSON-RPC.
pub type RpcApi = MarketplaceApi<
    InMemoryProfileRepository,
    SolanaRpcClient,
    Ed25519KeypairGenerator,
    Tasks,
    InMemoryTaskMessageRepository,
    SimulatedSettlement,
    DefaultClock,
>;

/// Builds the callable surface against `rpc_url`, returning the task
/// storage so tests can subscribe to its feed.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_api(rpc_url: &str) -> Result<(Arc<Tasks>, RpcApi), eyre::Report> {
    let config = SolanaRpcConfig::new(rpc_url)
        .with_commitment(Commitment::Confirmed)
        .with_timeout(Duration::from_secs(2));
    let tasks = Arc::new(ObservedTaskRepository::new(InMemoryTaskRepository::new()));
    let api = MarketplaceApi::from_ports(
        Arc::new(InMemoryProfileRepository::new()),
        Arc::new(SolanaRpcClient::new(config)?),
        Arc::new(Ed25519KeypairGenerator::new()),
        Arc::clone(&tasks),
        Arc::new(InMemoryTaskMessageRepository::new()),
        Arc::new(SimulatedSettlement::new()),
        Arc::new(DefaultClock),
    );
    Ok((tasks, api))
}

/// Returns an authenticated caller context.
///
/// # Errors
///
/// Returns an error for a blank user id.
pub fn caller(uid: &str) -> Result<CallerContext, eyre::Report> {
    Ok(CallerContext::authenticated(UserId::new(uid)?))
}
