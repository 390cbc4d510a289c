//! Callable endpoints for kaam-connect.
//!
//! Each endpoint is a named, authenticated remote procedure with a
//! JSON payload and a JSON result, using the camelCase field names clients
//! already speak. [`MarketplaceApi`] exposes the endpoints as typed methods
//! and through [`MarketplaceApi::dispatch`] by name. Every service failure
//! surfaces as a [`CallableError`] carrying exactly one [`CallableCode`].

mod api;
mod context;
pub mod dto;
mod error;

pub use api::{MarketplaceApi, Procedure};
pub use context::CallerContext;
pub use error::{CallableCode, CallableError, CallableResult};

#[cfg(test)]
mod tests;
