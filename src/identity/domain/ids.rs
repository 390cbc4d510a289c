//! Identity-provider user identifiers.

use super::IdentityDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted user identifier, in characters.
pub const MAX_USER_ID_CHARS: usize = 128;

/// Opaque user identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::EmptyUserId`] when the value is empty
    /// after trimming, or [`IdentityDomainError::UserIdTooLong`] when it
    /// exceeds [`MAX_USER_ID_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityDomainError::EmptyUserId);
        }
        if trimmed.chars().count() > MAX_USER_ID_CHARS {
            return Err(IdentityDomainError::UserIdTooLong {
                max: MAX_USER_ID_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
