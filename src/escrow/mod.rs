//! Escrow for kaam-connect tasks.
//!
//! A deposit against a task produces an escrow record, embedded on the task,
//! that moves from funded to released. Settlement goes through the
//! [`ports::EscrowSettlement`] port. The shipped adapters never move funds,
//! and every receipt says how far it can be trusted.
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
