//! Adapters for wallet ports.
//!
//! - [`solana_rpc::SolanaRpcClient`]: balance reads over Solana JSON-RPC
//! - [`memory::InMemoryLedger`]: fixed balance table for tests
//! - [`ed25519::Ed25519KeypairGenerator`]: custodial keypair generation

pub mod ed25519;
pub mod memory;
pub mod solana_rpc;
