//! User profile aggregate root.

use super::{IdentityDomainError, ParseIdentityValueError, Reputation, Review, UserId};
use crate::wallet::domain::{Lamports, Wallet, WalletAddress};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Marketplace side a user signed up for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Posts and funds tasks from abroad.
    Diaspora,
    /// Accepts and performs tasks locally.
    #[default]
    Local,
}

impl UserRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Diaspora => "diaspora",
            Self::Local => "local",
        }
    }
}

impl TryFrom<&str> for UserRole {
    type Error = ParseIdentityValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "diaspora" => Ok(Self::Diaspora),
            "local" => Ok(Self::Local),
            _ => Err(ParseIdentityValueError {
                kind: "user role",
                value: value.to_owned(),
            }),
        }
    }
}

/// Identity verification status. Starts pending and is never advanced here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Awaiting verification.
    #[default]
    Pending,
    /// Verified.
    Verified,
    /// Verification rejected.
    Rejected,
}

impl VerificationStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for VerificationStatus {
    type Error = ParseIdentityValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseIdentityValueError {
                kind: "verification status",
                value: value.to_owned(),
            }),
        }
    }
}

/// Identity-provider sign-in notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInEvent {
    /// Authenticated user.
    pub user_id: UserId,
    /// Display name reported by the provider, if any.
    pub display_name: Option<String>,
    /// Email reported by the provider, if any.
    pub email: Option<String>,
}

impl SignInEvent {
    /// Creates an event carrying only the user id.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            display_name: None,
            email: None,
        }
    }

    /// Sets the provider display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the provider email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Resolves the profile display name: provider name, then the local
    /// part of the email, then empty.
    #[must_use]
    pub fn resolved_display_name(&self) -> String {
        let provider_name = self
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let email_local = self
            .email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .map(str::trim)
            .filter(|local| !local.is_empty());
        provider_name.or(email_local).unwrap_or_default().to_owned()
    }
}

/// User profile aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    id: UserId,
    display_name: String,
    email: String,
    role: UserRole,
    verification: VerificationStatus,
    native_wallet: Option<Wallet>,
    external_wallets: Vec<Wallet>,
    reviews: Vec<Review>,
    reputation: Reputation,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProfileData {
    /// Persisted user identifier.
    pub id: UserId,
    /// Persisted display name.
    pub display_name: String,
    /// Persisted email.
    pub email: String,
    /// Persisted role.
    pub role: UserRole,
    /// Persisted verification status.
    pub verification: VerificationStatus,
    /// Persisted native wallet, if any.
    pub native_wallet: Option<Wallet>,
    /// Persisted external wallets.
    pub external_wallets: Vec<Wallet>,
    /// Persisted reviews.
    pub reviews: Vec<Review>,
    /// Persisted write revision.
    pub revision: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Creates the base profile written on a user's first sign-in.
    #[must_use]
    pub fn new_for_sign_in(event: &SignInEvent, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: event.user_id.clone(),
            display_name: event.resolved_display_name(),
            email: event.email.clone().unwrap_or_default(),
            role: UserRole::default(),
            verification: VerificationStatus::default(),
            native_wallet: None,
            external_wallets: Vec::new(),
            reviews: Vec::new(),
            reputation: Reputation::UNRATED,
            revision: 0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a profile from persisted storage.
    ///
    /// Reputation is recomputed from the persisted reviews.
    #[must_use]
    pub fn from_persisted(data: PersistedProfileData) -> Self {
        let reputation = Reputation::from_reviews(&data.reviews);
        Self {
            id: data.id,
            display_name: data.display_name,
            email: data.email,
            role: data.role,
            verification: data.verification,
            native_wallet: data.native_wallet.map(Wallet::without_recovery_phrase),
            external_wallets: data.external_wallets,
            reviews: data.reviews,
            reputation,
            revision: data.revision,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Sets the marketplace role chosen during sign-up.
    #[must_use]
    pub const fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the marketplace role.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }

    /// Returns the verification status.
    #[must_use]
    pub const fn verification(&self) -> VerificationStatus {
        self.verification
    }

    /// Returns the native wallet, if attached.
    #[must_use]
    pub const fn native_wallet(&self) -> Option<&Wallet> {
        self.native_wallet.as_ref()
    }

    /// Returns the connected external wallets.
    #[must_use]
    pub fn external_wallets(&self) -> &[Wallet] {
        &self.external_wallets
    }

    /// Returns the reviews received.
    #[must_use]
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Returns the derived reputation.
    #[must_use]
    pub const fn reputation(&self) -> Reputation {
        self.reputation
    }

    /// Returns the write revision this copy was read at.
    ///
    /// Repositories compare it on update so that concurrent writers cannot
    /// silently overwrite each other.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Attaches the profile's single native wallet.
    ///
    /// The recovery phrase is stripped before the wallet is stored.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::NativeWalletAlreadyAttached`] when a
    /// native wallet exists, or [`IdentityDomainError::WalletKindMismatch`]
    /// when `wallet` is external.
    pub fn attach_native_wallet(
        &mut self,
        wallet: Wallet,
        clock: &impl Clock,
    ) -> Result<(), IdentityDomainError> {
        if !wallet.is_native() {
            return Err(IdentityDomainError::WalletKindMismatch(self.id.clone()));
        }
        if self.native_wallet.is_some() {
            return Err(IdentityDomainError::NativeWalletAlreadyAttached(
                self.id.clone(),
            ));
        }
        self.native_wallet = Some(wallet.without_recovery_phrase());
        self.touch(clock);
        Ok(())
    }

    /// Adds an external wallet with union semantics: connecting an address
    /// already on the list replaces its cached balance instead of
    /// duplicating the entry.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::WalletKindMismatch`] when `wallet` is
    /// native.
    pub fn add_external_wallet(
        &mut self,
        wallet: Wallet,
        clock: &impl Clock,
    ) -> Result<(), IdentityDomainError> {
        if wallet.is_native() {
            return Err(IdentityDomainError::WalletKindMismatch(self.id.clone()));
        }
        match self
            .external_wallets
            .iter_mut()
            .find(|existing| existing.address() == wallet.address())
        {
            Some(existing) => *existing = wallet,
            None => self.external_wallets.push(wallet),
        }
        self.touch(clock);
        Ok(())
    }

    /// Applies freshly fetched balances to every matching wallet.
    pub fn apply_balances(
        &mut self,
        balances: &[(WalletAddress, Lamports)],
        clock: &impl Clock,
    ) {
        let lookup = |address: &WalletAddress| {
            balances
                .iter()
                .find(|(candidate, _)| candidate == address)
                .map(|(_, balance)| *balance)
        };
        if let Some(wallet) = self.native_wallet.take() {
            let refreshed = match lookup(wallet.address()) {
                Some(balance) => wallet.with_balance(balance),
                None => wallet,
            };
            self.native_wallet = Some(refreshed);
        }
        self.external_wallets = std::mem::take(&mut self.external_wallets)
            .into_iter()
            .map(|wallet| match lookup(wallet.address()) {
                Some(balance) => wallet.with_balance(balance),
                None => wallet,
            })
            .collect();
        self.touch(clock);
    }

    /// Records a review and recomputes reputation.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::SelfReview`] when the author is the
    /// profile owner.
    pub fn record_review(
        &mut self,
        review: Review,
        clock: &impl Clock,
    ) -> Result<(), IdentityDomainError> {
        if review.author() == &self.id {
            return Err(IdentityDomainError::SelfReview(self.id.clone()));
        }
        self.reviews.push(review);
        self.reputation = Reputation::from_reviews(&self.reviews);
        self.touch(clock);
        Ok(())
    }

    /// Returns every wallet address on the profile, native first.
    #[must_use]
    pub fn wallet_addresses(&self) -> Vec<WalletAddress> {
        self.native_wallet
            .iter()
            .chain(self.external_wallets.iter())
            .map(|wallet| wallet.address().clone())
            .collect()
    }

    /// Returns the copy a repository stores after a successful update.
    #[must_use]
    pub(crate) fn into_next_revision(mut self) -> Self {
        self.revision = self.revision.saturating_add(1);
        self
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
