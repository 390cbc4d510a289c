//! Lamport quantities and SOL conversion.

use super::WalletDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// An amount of SOL expressed in lamports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lamports(u64);

impl Lamports {
    /// Zero lamports.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw lamport count.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Converts a SOL quantity into lamports, rounding to the nearest lamport.
    ///
    /// # Errors
    ///
    /// Returns [`WalletDomainError::InvalidAmount`] when `sol` is negative,
    /// NaN, infinite, or larger than `u64::MAX` lamports.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "SOL amounts arrive as floating-point values on the wire"
    )]
    pub fn from_sol(sol: f64) -> Result<Self, WalletDomainError> {
        if !sol.is_finite() || sol.is_sign_negative() {
            return Err(WalletDomainError::InvalidAmount(sol.to_string()));
        }
        let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
        if lamports >= u64::MAX as f64 {
            return Err(WalletDomainError::InvalidAmount(sol.to_string()));
        }
        Ok(Self(lamports as u64))
    }

    /// Returns the display quantity in SOL.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "display balances are floating-point SOL"
    )]
    pub fn as_sol(self) -> f64 {
        self.0 as f64 / LAMPORTS_PER_SOL as f64
    }

    /// Returns the raw lamport count.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns `true` for a zero amount.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Lamports {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Lamports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lamports", self.0)
    }
}
