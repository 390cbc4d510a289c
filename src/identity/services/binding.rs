//! Binds identity-provider sign-ins to marketplace profiles.

use crate::identity::{
    domain::{IdentityDomainError, Profile, Review, SignInEvent, UserId, UserRole},
    ports::{ProfileRepository, ProfileRepositoryError},
};
use crate::wallet::{
    domain::RecoveryPhrase,
    ports::{ChainBalanceSource, KeypairGenerator},
    services::{WalletRegistryError, WalletRegistryService},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const MAX_WRITE_ATTEMPTS: usize = 5;

/// Service-level errors for identity binding.
#[derive(Debug, Error)]
pub enum IdentityBindingError {
    /// Profile mutation was rejected.
    #[error(transparent)]
    Domain(#[from] IdentityDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProfileRepositoryError),
    /// Native wallet provisioning failed.
    #[error(transparent)]
    Wallet(#[from] WalletRegistryError),
    /// No profile exists for the user.
    #[error("profile not found: {0}")]
    ProfileNotFound(UserId),
    /// Concurrent writers kept winning the profile update.
    #[error("profile {0} is under heavy concurrent modification")]
    Contention(UserId),
}

/// Result type for identity binding operations.
pub type IdentityBindingResult<T> = Result<T, IdentityBindingError>;

/// Result of processing a sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInOutcome {
    /// The profile as stored after sign-in processing.
    pub profile: Profile,
    /// `true` when the profile was created by this sign-in.
    pub created: bool,
    /// Recovery phrase of a native wallet generated during this sign-in.
    /// Shown to the user once and never stored.
    pub recovery_phrase: Option<RecoveryPhrase>,
}

/// Review submission parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReviewRequest {
    subject: UserId,
    author: UserId,
    positive: bool,
    comment: Option<String>,
    images: Vec<String>,
}

impl SubmitReviewRequest {
    /// Creates a review request from `author` about `subject`.
    #[must_use]
    pub const fn new(subject: UserId, author: UserId, positive: bool) -> Self {
        Self {
            subject,
            author,
            positive,
            comment: None,
            images: Vec::new(),
        }
    }

    /// Attaches a free-text comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Attaches image references.
    #[must_use]
    pub fn with_images(mut self, images: impl IntoIterator<Item = String>) -> Self {
        self.images = images.into_iter().collect();
        self
    }
}

/// Identity binding orchestration service.
pub struct IdentityBindingService<P, B, K, C>
where
    P: ProfileRepository,
    B: ChainBalanceSource,
    K: KeypairGenerator,
    C: Clock + Send + Sync,
{
    profiles: Arc<P>,
    wallets: WalletRegistryService<P, B, K, C>,
    clock: Arc<C>,
}

impl<P, B, K, C> Clone for IdentityBindingService<P, B, K, C>
where
    P: ProfileRepository,
    B: ChainBalanceSource,
    K: KeypairGenerator,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            profiles: Arc::clone(&self.profiles),
            wallets: self.wallets.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, B, K, C> IdentityBindingService<P, B, K, C>
where
    P: ProfileRepository,
    B: ChainBalanceSource,
    K: KeypairGenerator,
    C: Clock + Send + Sync,
{
    /// Creates a new identity binding service.
    #[must_use]
    pub const fn new(
        profiles: Arc<P>,
        wallets: WalletRegistryService<P, B, K, C>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            profiles,
            wallets,
            clock,
        }
    }

    /// Processes a sign-in.
    ///
    /// First sign-in writes a base profile with the default role. A profile
    /// without a native wallet gets one generated; a profile that already
    /// has one gets its balances refreshed best-effort. The returned profile
    /// is re-read after those steps.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityBindingError::Repository`] on persistence failure or
    /// [`IdentityBindingError::Wallet`] when native wallet generation fails.
    pub async fn on_sign_in(&self, event: &SignInEvent) -> IdentityBindingResult<SignInOutcome> {
        self.on_sign_in_as(event, UserRole::default()).await
    }

    /// Processes a sign-in, using `role` if the profile is created now.
    ///
    /// # Errors
    ///
    /// See [`Self::on_sign_in`].
    pub async fn on_sign_in_as(
        &self,
        event: &SignInEvent,
        role: UserRole,
    ) -> IdentityBindingResult<SignInOutcome> {
        let user_id = &event.user_id;
        let (existing, created) = match self.profiles.find(user_id).await? {
            Some(profile) => (profile, false),
            None => self.create_profile(event, role).await?,
        };

        let recovery_phrase = if existing.native_wallet().is_some() {
            if let Err(err) = self.wallets.fetch_balances(user_id).await {
                warn!(user = %user_id, error = %err, "balance refresh on sign-in failed");
            }
            None
        } else {
            let outcome = self.wallets.generate_native_wallet(user_id).await?;
            outcome
                .generated
                .then(|| outcome.wallet.recovery_phrase().cloned())
                .flatten()
        };

        let profile = self.load(user_id).await?;
        Ok(SignInOutcome {
            profile,
            created,
            recovery_phrase,
        })
    }

    /// Returns the profile for `user_id`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityBindingError::Repository`] when the read fails.
    pub async fn find(&self, user_id: &UserId) -> IdentityBindingResult<Option<Profile>> {
        Ok(self.profiles.find(user_id).await?)
    }

    /// Records a review on the subject's profile and returns the updated
    /// profile with recomputed reputation.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityBindingError::Domain`] for a self-review or
    /// [`IdentityBindingError::ProfileNotFound`] when the subject has no
    /// profile.
    pub async fn record_review(
        &self,
        request: SubmitReviewRequest,
    ) -> IdentityBindingResult<Profile> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut profile = self.load(&request.subject).await?;
            let mut review = Review::new(request.author.clone(), request.positive, &*self.clock)
                .with_images(request.images.iter().cloned());
            if let Some(comment) = &request.comment {
                review = review.with_comment(comment.clone());
            }
            profile.record_review(review, &*self.clock)?;
            match self.profiles.update(&profile).await {
                Ok(stored) => {
                    info!(
                        subject = %request.subject,
                        author = %request.author,
                        score_bps = stored.reputation().score_bps(),
                        "recorded review"
                    );
                    return Ok(stored);
                }
                Err(ProfileRepositoryError::Conflict { .. }) => {}
                Err(err) => return Err(err.into()),
            }
        }
        Err(IdentityBindingError::Contention(request.subject))
    }

    async fn create_profile(
        &self,
        event: &SignInEvent,
        role: UserRole,
    ) -> IdentityBindingResult<(Profile, bool)> {
        let profile = Profile::new_for_sign_in(event, &*self.clock).with_role(role);
        match self.profiles.create(&profile).await {
            Ok(()) => {
                info!(user = %event.user_id, role = role.as_str(), "created profile on first sign-in");
                Ok((profile, true))
            }
            Err(ProfileRepositoryError::DuplicateProfile(_)) => {
                Ok((self.load(&event.user_id).await?, false))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn load(&self, user_id: &UserId) -> IdentityBindingResult<Profile> {
        self.profiles
            .find(user_id)
            .await?
            .ok_or_else(|| IdentityBindingError::ProfileNotFound(user_id.clone()))
    }
}
