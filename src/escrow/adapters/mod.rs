//! Settlement adapters.
//!
//! - [`SimulatedSettlement`]: tags every receipt as simulated
//! - [`FailingSettlement`]: rejects settlements with a fixed reason

mod failing;
mod simulated;

pub use failing::FailingSettlement;
pub use simulated::SimulatedSettlement;
