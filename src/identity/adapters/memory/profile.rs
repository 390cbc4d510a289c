//! In-memory repository for profiles.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::{
    domain::{Profile, UserId},
    ports::{ProfileRepository, ProfileRepositoryError, ProfileRepositoryResult},
};

/// Thread-safe in-memory profile repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<RwLock<HashMap<UserId, Profile>>>,
}

impl InMemoryProfileRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> ProfileRepositoryError {
    ProfileRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: &Profile) -> ProfileRepositoryResult<()> {
        let mut profiles = self.profiles.write().map_err(lock_error)?;
        if profiles.contains_key(profile.id()) {
            return Err(ProfileRepositoryError::DuplicateProfile(
                profile.id().clone(),
            ));
        }
        profiles.insert(profile.id().clone(), profile.clone());
        Ok(())
    }

    async fn find(&self, id: &UserId) -> ProfileRepositoryResult<Option<Profile>> {
        let profiles = self.profiles.read().map_err(lock_error)?;
        Ok(profiles.get(id).cloned())
    }

    async fn update(&self, profile: &Profile) -> ProfileRepositoryResult<Profile> {
        let mut profiles = self.profiles.write().map_err(lock_error)?;
        let stored = profiles
            .get(profile.id())
            .ok_or_else(|| ProfileRepositoryError::NotFound(profile.id().clone()))?;
        if stored.revision() != profile.revision() {
            return Err(ProfileRepositoryError::Conflict {
                id: profile.id().clone(),
                expected: profile.revision(),
            });
        }
        let next = profile.clone().into_next_revision();
        profiles.insert(next.id().clone(), next.clone());
        Ok(next)
    }
}
