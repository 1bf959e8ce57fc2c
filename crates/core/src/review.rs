//! Review model and validation.
//!
//! Reviews are append-only: inserted by their author, listed newest-first,
//! never edited or deleted.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp, UserId};

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted rating.
pub const MAX_RATING: u8 = 5;

/// Label shown on the viewer's own reviews.
pub const OWN_REVIEW_LABEL: &str = "Você";

/// Label shown on everyone else's reviews (no profile join is performed).
pub const OTHER_REVIEW_LABEL: &str = "User";

/* --------------------------------------------------------------------------
Types
-------------------------------------------------------------------------- */

/// A row of the `reviews` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: DbId,
    pub drama_id: DbId,
    pub user_id: UserId,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: Timestamp,
}

/// Insert payload for the `reviews` table. `id` and `created_at` are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub drama_id: DbId,
    pub user_id: UserId,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Review {
    /// Display label for the author relative to the viewing user.
    pub fn author_label(&self, viewer: Option<UserId>) -> &'static str {
        if viewer == Some(self.user_id) {
            OWN_REVIEW_LABEL
        } else {
            OTHER_REVIEW_LABEL
        }
    }
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate that a rating is within `MIN_RATING..=MAX_RATING`.
pub fn validate_rating(rating: u8) -> Result<(), CoreError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )))
    }
}

/// Trim a free-text comment, mapping blank input to `None`.
pub fn normalize_comment(comment: &str) -> Option<String> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Sort reviews newest first.
pub fn sort_newest_first(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
