//! Task store for kaam-connect.
//!
//! Creators post tasks with a promised payment; local providers accept
//! them; either participant finalizes, which settles the task's escrow and
//! completes it. Each task also owns a timestamped chat log. The module
//! follows hexagonal architecture:
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
