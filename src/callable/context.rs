//! Caller identity attached to every call.

use super::{CallableError, CallableResult};
use crate::identity::domain::UserId;

/// Authentication context of a callable request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    uid: Option<UserId>,
}

impl CallerContext {
    /// Context of an unauthenticated caller.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { uid: None }
    }

    /// Context of a caller the identity provider authenticated as `uid`.
    #[must_use]
    pub const fn authenticated(uid: UserId) -> Self {
        Self { uid: Some(uid) }
    }

    /// Returns the authenticated user, if any.
    #[must_use]
    pub const fn uid(&self) -> Option<&UserId> {
        self.uid.as_ref()
    }

    /// Returns the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an `unauthenticated` error when no user is present.
    pub fn require_uid(&self) -> CallableResult<&UserId> {
        self.uid
            .as_ref()
            .ok_or_else(|| CallableError::unauthenticated("User must be authenticated"))
    }
}
