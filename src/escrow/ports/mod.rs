//! Port contracts for escrow settlement.

pub mod settlement;

pub use settlement::{EscrowSettlement, SettlementError, SettlementResult};

#[cfg(test)]
pub use settlement::MockEscrowSettlement;
