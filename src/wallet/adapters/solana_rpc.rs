//! Solana JSON-RPC balance adapter.

use crate::wallet::{
    domain::{Lamports, WalletAddress},
    ports::{ChainBalanceSource, ChainError, ChainResult},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Public devnet endpoint.
pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

/// Public mainnet-beta endpoint.
pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Commitment level attached to balance queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Most recent block, may be rolled back.
    Processed,
    /// Voted on by a supermajority.
    #[default]
    Confirmed,
    /// Rooted.
    Finalized,
}

impl Commitment {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl FromStr for Commitment {
    type Err = ChainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            other => Err(ChainError::MalformedResponse(format!(
                "unknown commitment level '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for [`SolanaRpcClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolanaRpcConfig {
    /// JSON-RPC endpoint URL.
    pub endpoint: String,
    /// Commitment level for balance reads.
    pub commitment: Commitment,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SolanaRpcConfig {
    /// Creates a configuration for `endpoint` with default commitment and
    /// timeout.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            commitment: Commitment::default(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the commitment level.
    #[must_use]
    pub const fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SolanaRpcConfig {
    fn default() -> Self {
        Self::new(DEVNET_RPC_URL)
    }
}

/// `getBalance` client over HTTP JSON-RPC.
#[derive(Debug, Clone)]
pub struct SolanaRpcClient {
    config: SolanaRpcConfig,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (&'a str, CommitmentParam),
}

#[derive(Debug, Serialize)]
struct CommitmentParam {
    commitment: Commitment,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<BalanceResult>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct BalanceResult {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl SolanaRpcClient {
    /// Builds a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: SolanaRpcConfig) -> ChainResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ChainError::transport)?;
        Ok(Self { config, http })
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &SolanaRpcConfig {
        &self.config
    }
}

#[async_trait]
impl ChainBalanceSource for SolanaRpcClient {
    async fn balance(&self, address: &WalletAddress) -> ChainResult<Lamports> {
        address.decode()?;

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "getBalance",
            params: (
                address.as_str(),
                CommitmentParam {
                    commitment: self.config.commitment,
                },
            ),
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(ChainError::transport)?
            .error_for_status()
            .map_err(ChainError::transport)?;
        let body: RpcResponse = response.json().await.map_err(ChainError::transport)?;

        match body {
            RpcResponse {
                error: Some(error), ..
            } => Err(ChainError::Rpc {
                code: error.code,
                message: error.message,
            }),
            RpcResponse {
                result: Some(result),
                ..
            } => {
                debug!(%address, lamports = result.value, "fetched balance");
                Ok(Lamports::new(result.value))
            }
            RpcResponse { .. } => Err(ChainError::MalformedResponse(
                "response has neither result nor error".to_owned(),
            )),
        }
    }
}
