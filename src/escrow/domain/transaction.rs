//! Settlement transaction identifiers.

use super::EscrowDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a settlement transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates a validated transaction identifier.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowDomainError::EmptyTransactionId`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, EscrowDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EscrowDomainError::EmptyTransactionId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
