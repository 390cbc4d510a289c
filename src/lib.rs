//! kaam-connect: a local task marketplace backend.
//!
//! Users post tasks with a promised payment, nearby providers accept them,
//! and either side finalizes the work, which settles an escrow recorded
//! against the task. Wallet balances come from a Solana RPC endpoint.
//!
//! # Architecture
//!
//! Each module follows hexagonal architecture:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, RPC, etc.)
//!
//! # Modules
//!
//! - [`identity`]: Profiles bound to the external identity provider
//! - [`wallet`]: Native and external wallets with on-chain balances
//! - [`task`]: Task lifecycle and per-task chat logs
//! - [`escrow`]: Escrow records and settlement
//! - [`snapshot`]: Ordered change feeds for live task lists
//! - [`callable`]: Authenticated procedure surface for clients

pub mod callable;
pub mod escrow;
pub mod identity;
pub mod snapshot;
pub mod task;
pub mod wallet;
