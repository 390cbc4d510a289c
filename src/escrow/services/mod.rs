//! Application services for escrow.

mod escrow;

pub use escrow::{
    DepositOutcome, DepositRequest, EscrowService, EscrowServiceError, EscrowServiceResult,
    ReleaseOutcome,
};
