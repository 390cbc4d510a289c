//! Wallet registry for kaam-connect.
//!
//! Every profile holds at most one native wallet, a keypair generated and
//! custodially held by the marketplace, plus any number of external wallets
//! the user connects by public key. Balances are never authoritative here:
//! they are pulled from a Solana RPC endpoint on demand and cached on the
//! profile until the next refresh.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
