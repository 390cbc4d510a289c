//! Domain model for task escrow records and settlement receipts.

mod error;
mod record;
mod transaction;

pub use error::EscrowDomainError;
pub use record::{EscrowRecord, EscrowState, SettlementReceipt, SettlementVerification};
pub use transaction::TransactionId;
