//! Domain model for user profiles, reviews, and reputation.

mod error;
mod ids;
mod profile;
mod review;

pub use error::{IdentityDomainError, ParseIdentityValueError};
pub use ids::{MAX_USER_ID_CHARS, UserId};
pub use profile::{PersistedProfileData, Profile, SignInEvent, UserRole, VerificationStatus};
pub use review::{MAX_SCORE_BPS, Reputation, ReputationTier, Review};
