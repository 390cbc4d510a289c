//! Repository port for profile persistence.

use crate::identity::domain::{Profile, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for profile repository operations.
pub type ProfileRepositoryResult<T> = Result<T, ProfileRepositoryError>;

/// Profile persistence contract.
///
/// Writes are single-document and atomic. [`Self::update`] is a
/// compare-and-set on [`Profile::revision`], which is what keeps overlapping
/// sign-ins from attaching two native wallets.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Stores a new profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileRepositoryError::DuplicateProfile`] when a profile
    /// with the same user id already exists.
    async fn create(&self, profile: &Profile) -> ProfileRepositoryResult<()>;

    /// Finds a profile by user id.
    ///
    /// Returns `None` when no profile exists.
    async fn find(&self, id: &UserId) -> ProfileRepositoryResult<Option<Profile>>;

    /// Replaces a profile if its stored revision still equals
    /// `profile.revision()`, and returns the stored copy with the advanced
    /// revision.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileRepositoryError::NotFound`] when the profile does not
    /// exist or [`ProfileRepositoryError::Conflict`] when another writer
    /// updated it first.
    async fn update(&self, profile: &Profile) -> ProfileRepositoryResult<Profile>;
}

/// Errors returned by profile repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ProfileRepositoryError {
    /// A profile with the same user id already exists.
    #[error("duplicate profile: {0}")]
    DuplicateProfile(UserId),

    /// The profile was not found.
    #[error("profile not found: {0}")]
    NotFound(UserId),

    /// The stored revision moved on since the profile was read.
    #[error("profile {id} was modified concurrently (expected revision {expected})")]
    Conflict {
        /// Profile identifier.
        id: UserId,
        /// Revision the writer read.
        expected: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProfileRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
