//! Command-line entry point for kaam-connect.
//!
//! Usage:
//!
//! ```text
//! kaam-connect balance <PUBKEY>...
//! kaam-connect keygen
//! kaam-connect call <PROCEDURE> --uid <UID> [--payload JSON] [--sign-in]
//! ```
//!
//! Environment variables (also read from `.env`):
//!
//! - `SOLANA_RPC_URL`: JSON-RPC endpoint (default: devnet)
//! - `SOLANA_COMMITMENT`: `processed`, `confirmed`, or `finalized`
//!   (default: `confirmed`)
//! - `RPC_TIMEOUT_MS`: per-request timeout (default: 10000)
//! - `DATABASE_URL`: `PostgreSQL` URL; in-memory storage when unset
//! - `RUST_LOG`: log filter (default: `info,kaam_connect=debug`)

use clap::{Parser, Subcommand};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use kaam_connect::callable::{CallerContext, MarketplaceApi};
use kaam_connect::escrow::{adapters::SimulatedSettlement, ports::EscrowSettlement};
use kaam_connect::identity::{
    adapters::{memory::InMemoryProfileRepository, postgres::PostgresProfileRepository},
    domain::UserId,
    ports::ProfileRepository,
};
use kaam_connect::task::{
    adapters::{
        memory::{InMemoryTaskMessageRepository, InMemoryTaskRepository},
        observed::ObservedTaskRepository,
        postgres::{PostgresTaskMessageRepository, PostgresTaskRepository},
    },
    ports::{TaskMessageRepository, TaskRepository},
};
use kaam_connect::wallet::{
    adapters::{
        ed25519::Ed25519KeypairGenerator,
        solana_rpc::{Commitment, DEVNET_RPC_URL, SolanaRpcClient, SolanaRpcConfig},
    },
    domain::WalletAddress,
    ports::{ChainBalanceSource, KeypairGenerator},
};
use mockable::DefaultClock;
use serde_json::{Value, json};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "info,kaam_connect=debug";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Parser)]
#[command(name = "kaam-connect", version, about = "Task marketplace backend tools")]
struct Cli {
    /// Solana JSON-RPC endpoint.
    #[arg(long, env = "SOLANA_RPC_URL", default_value = DEVNET_RPC_URL, global = true)]
    rpc_url: String,

    /// Commitment level for balance reads.
    #[arg(long, env = "SOLANA_COMMITMENT", default_value = "confirmed", global = true)]
    commitment: String,

    /// Per-request RPC timeout in milliseconds.
    #[arg(long, env = "RPC_TIMEOUT_MS", default_value_t = 10_000, global = true)]
    rpc_timeout_ms: u64,

    /// `PostgreSQL` URL. In-memory storage when unset.
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints on-chain balances.
    Balance {
        /// Base58 public keys.
        #[arg(required = true)]
        pubkeys: Vec<String>,
    },
    /// Generates a custodial keypair without storing it.
    Keygen,
    /// Invokes a callable procedure.
    Call {
        /// Procedure name, such as `fetchBalances`.
        procedure: String,
        /// Authenticated caller.
        #[arg(long)]
        uid: String,
        /// JSON payload.
        #[arg(long, default_value = "null")]
        payload: String,
        /// Binds the caller's identity before the call.
        #[arg(long)]
        sign_in: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(err) => debug!(error = %err, "no environment file loaded"),
    }

    let cli = Cli::parse();
    let rpc = rpc_config(&cli)?;
    match cli.command {
        Command::Balance { pubkeys } => print_balances(rpc, &pubkeys).await,
        Command::Keygen => print_keypair(),
        Command::Call {
            procedure,
            uid,
            payload,
            sign_in,
        } => {
            let call = Call {
                procedure,
                ctx: CallerContext::authenticated(UserId::new(uid)?),
                payload: serde_json::from_str(&payload).map_err(CliError::Payload)?,
                sign_in,
            };
            run_call(rpc, cli.database_url.as_deref(), call).await
        }
    }
}

fn rpc_config(cli: &Cli) -> Result<SolanaRpcConfig, CliError> {
    let commitment: Commitment = cli
        .commitment
        .parse()
        .map_err(|err| CliError::Config(format!("{err}")))?;
    Ok(SolanaRpcConfig::new(cli.rpc_url.clone())
        .with_commitment(commitment)
        .with_timeout(Duration::from_millis(cli.rpc_timeout_ms)))
}

async fn print_balances(rpc: SolanaRpcConfig, pubkeys: &[String]) -> Result<(), BoxError> {
    let client = SolanaRpcClient::new(rpc)?;
    let mut out = io::stdout().lock();
    for pubkey in pubkeys {
        let address = WalletAddress::new(pubkey.as_str())?;
        let line = match client.balance(&address).await {
            Ok(balance) => json!({
                "pubkey": address.as_str(),
                "lamports": balance.value(),
                "balance": balance.as_sol(),
            }),
            Err(err) => {
                warn!(%address, error = %err, "balance lookup failed");
                json!({ "pubkey": address.as_str(), "error": err.to_string() })
            }
        };
        writeln!(out, "{line}").map_err(CliError::Output)?;
    }
    Ok(())
}

fn print_keypair() -> Result<(), BoxError> {
    let keypair = Ed25519KeypairGenerator::new().generate()?;
    let line = json!({
        "pubkey": keypair.address.as_str(),
        "passphrase": keypair.recovery_phrase.reveal(),
    });
    writeln!(io::stdout().lock(), "{line}").map_err(CliError::Output)?;
    Ok(())
}

struct Call {
    procedure: String,
    ctx: CallerContext,
    payload: Value,
    sign_in: bool,
}

async fn run_call(
    rpc: SolanaRpcConfig,
    database_url: Option<&str>,
    call: Call,
) -> Result<(), BoxError> {
    let chain = Arc::new(SolanaRpcClient::new(rpc)?);
    let keygen = Arc::new(Ed25519KeypairGenerator::new());
    let settlement = Arc::new(SimulatedSettlement::new());

    if let Some(url) = database_url {
        info!("using PostgreSQL storage");
        let pool = Pool::builder().build_unchecked(ConnectionManager::<PgConnection>::new(url));
        let api = MarketplaceApi::from_ports(
            Arc::new(PostgresProfileRepository::new(pool.clone())),
            chain,
            keygen,
            Arc::new(ObservedTaskRepository::new(PostgresTaskRepository::new(pool.clone()))),
            Arc::new(PostgresTaskMessageRepository::new(pool)),
            settlement,
            Arc::new(DefaultClock),
        );
        invoke(&api, call).await
    } else {
        info!("DATABASE_URL unset, using in-memory storage");
        let api = MarketplaceApi::from_ports(
            Arc::new(InMemoryProfileRepository::new()),
            chain,
            keygen,
            Arc::new(ObservedTaskRepository::new(InMemoryTaskRepository::new())),
            Arc::new(InMemoryTaskMessageRepository::new()),
            settlement,
            Arc::new(DefaultClock),
        );
        invoke(&api, call).await
    }
}

async fn invoke<P, B, K, R, M, S>(
    api: &MarketplaceApi<P, B, K, R, M, S, DefaultClock>,
    call: Call,
) -> Result<(), BoxError>
where
    P: ProfileRepository,
    B: ChainBalanceSource,
    K: KeypairGenerator,
    R: TaskRepository,
    M: TaskMessageRepository,
    S: EscrowSettlement,
{
    if call.sign_in {
        api.dispatch("signIn", &call.ctx, Value::Null).await?;
    }
    let body = match api.dispatch(&call.procedure, &call.ctx, call.payload).await {
        Ok(result) => json!({ "result": result }),
        Err(err) => {
            warn!(procedure = %call.procedure, code = %err.code(), "call failed");
            json!({ "error": err })
        }
    };
    writeln!(io::stdout().lock(), "{body}").map_err(CliError::Output)?;
    Ok(())
}
