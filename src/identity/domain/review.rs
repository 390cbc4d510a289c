//! Reviews and the reputation score derived from them.

use super::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Full score in basis points.
pub const MAX_SCORE_BPS: u16 = 10_000;

const TRUSTED_THRESHOLD_BPS: u16 = 7_000;
const POOR_THRESHOLD_BPS: u16 = 3_000;

/// A thumbs-up or thumbs-down review left after a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    author: UserId,
    positive: bool,
    comment: Option<String>,
    images: Vec<String>,
    created_at: DateTime<Utc>,
}

impl Review {
    /// Creates a review stamped with the current clock time.
    #[must_use]
    pub fn new(author: UserId, positive: bool, clock: &impl Clock) -> Self {
        Self {
            author,
            positive,
            comment: None,
            images: Vec::new(),
            created_at: clock.utc(),
        }
    }

    /// Attaches a free-text comment. Blank comments are dropped.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let text = comment.into();
        let trimmed = text.trim();
        self.comment = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Attaches image URLs.
    #[must_use]
    pub fn with_images(mut self, images: impl IntoIterator<Item = String>) -> Self {
        self.images = images.into_iter().collect();
        self
    }

    /// Returns the review author.
    #[must_use]
    pub const fn author(&self) -> &UserId {
        &self.author
    }

    /// Returns `true` for a positive review.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.positive
    }

    /// Returns the comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns attached image URLs.
    #[must_use]
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Coarse reputation band shown next to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationTier {
    /// No reviews yet.
    Unrated,
    /// At most 30% positive.
    Poor,
    /// Between the poor and trusted thresholds.
    Neutral,
    /// At least 70% positive.
    Trusted,
}

impl ReputationTier {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unrated => "unrated",
            Self::Poor => "poor",
            Self::Neutral => "neutral",
            Self::Trusted => "trusted",
        }
    }
}

/// Share of positive reviews, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reputation {
    score_bps: u16,
    review_count: u32,
}

impl Reputation {
    /// Reputation of a profile with no reviews.
    pub const UNRATED: Self = Self {
        score_bps: 0,
        review_count: 0,
    };

    /// Recomputes reputation from a review list.
    #[must_use]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let total = u32::try_from(reviews.len()).unwrap_or(u32::MAX);
        if total == 0 {
            return Self::UNRATED;
        }
        let positive =
            u32::try_from(reviews.iter().filter(|review| review.positive).count()).unwrap_or(total);
        let score = positive
            .saturating_mul(u32::from(MAX_SCORE_BPS))
            .checked_div(total)
            .unwrap_or_default();
        Self {
            score_bps: u16::try_from(score).unwrap_or(MAX_SCORE_BPS),
            review_count: total,
        }
    }

    /// Restores a persisted reputation value.
    #[must_use]
    pub fn from_persisted(score_bps: u16, review_count: u32) -> Self {
        Self {
            score_bps: score_bps.min(MAX_SCORE_BPS),
            review_count,
        }
    }

    /// Returns the score in basis points.
    #[must_use]
    pub const fn score_bps(self) -> u16 {
        self.score_bps
    }

    /// Returns the number of reviews behind the score.
    #[must_use]
    pub const fn review_count(self) -> u32 {
        self.review_count
    }

    /// Returns the reputation band.
    #[must_use]
    pub const fn tier(self) -> ReputationTier {
        if self.review_count == 0 {
            ReputationTier::Unrated
        } else if self.score_bps >= TRUSTED_THRESHOLD_BPS {
            ReputationTier::Trusted
        } else if self.score_bps <= POOR_THRESHOLD_BPS {
            ReputationTier::Poor
        } else {
            ReputationTier::Neutral
        }
    }
}

impl Default for Reputation {
    fn default() -> Self {
        Self::UNRATED
    }
}
