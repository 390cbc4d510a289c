//! Identity binding for kaam-connect.
//!
//! The external identity provider authenticates users; this module keeps
//! the marketplace-side profile keyed by the provider's user id. A profile
//! records the user's role, verification status, wallets, and the reviews
//! other users have left, from which reputation is derived.
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
