//! Review listing and submission for the details view.

use std::sync::Arc;

use dorama_core::review::{self, NewReview, Review};
use dorama_core::session::AuthUser;
use dorama_core::types::{DbId, Timestamp};
use dorama_db::RemoteStore;
use dorama_events::{AppEvent, EventBus};
use serde::Serialize;

use crate::error::LibraryError;

/// The review form's editable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewForm {
    pub rating: Option<u8>,
    pub comment: String,
}

impl ReviewForm {
    pub fn clear(&mut self) {
        self.rating = None;
        self.comment.clear();
    }
}

/// A review as shown in the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewView {
    pub id: DbId,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    /// `"Você"` for the viewer's own reviews, `"User"` otherwise.
    pub author: &'static str,
}

impl ReviewView {
    fn from_review(review: Review, viewer: Option<&AuthUser>) -> Self {
        Self {
            author: review.author_label(viewer.map(|u| u.id)),
            id: review.id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

/// Outcome of [`ReviewService::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The review was stored; carries the reloaded list.
    Submitted(Vec<ReviewView>),
    /// No session; nothing was sent.
    SignedOut,
}

pub struct ReviewService {
    remote: Arc<dyn RemoteStore>,
    bus: Arc<EventBus>,
}

impl ReviewService {
    pub fn new(remote: Arc<dyn RemoteStore>, bus: Arc<EventBus>) -> Self {
        Self { remote, bus }
    }

    /// Reviews of `drama_id`, newest first, labelled for `viewer`.
    pub async fn list(
        &self,
        drama_id: DbId,
        viewer: Option<&AuthUser>,
    ) -> Result<Vec<ReviewView>, LibraryError> {
        let mut reviews = self.remote.list_reviews(drama_id).await?;
        review::sort_newest_first(&mut reviews);
        Ok(reviews
            .into_iter()
            .map(|r| ReviewView::from_review(r, viewer))
            .collect())
    }

    /// Submit the form for `drama_id`.
    ///
    /// A missing rating is rejected before anything else. Without a session
    /// nothing happens. On success the form is cleared, the list reloaded,
    /// and [`AppEvent::ReviewsChanged`] published. On a store failure the
    /// form is left intact.
    pub async fn submit(
        &self,
        drama_id: DbId,
        user: Option<&AuthUser>,
        form: &mut ReviewForm,
    ) -> Result<SubmitOutcome, LibraryError> {
        let rating = form.rating.ok_or(LibraryError::MissingRating)?;
        review::validate_rating(rating)?;
        let Some(user) = user else {
            tracing::debug!(drama_id, "Review submit ignored without a session");
            return Ok(SubmitOutcome::SignedOut);
        };

        let new_review = NewReview {
            drama_id,
            user_id: user.id,
            rating,
            comment: review::normalize_comment(&form.comment),
        };
        if let Err(e) = self.remote.insert_review(&new_review).await {
            tracing::error!(drama_id, user_id = %user.id, error = %e, "Failed to submit review");
            return Err(e.into());
        }
        tracing::info!(drama_id, user_id = %user.id, rating, "Review submitted");

        form.clear();
        self.bus.publish(AppEvent::ReviewsChanged { drama_id });
        let reviews = self.list(drama_id, Some(user)).await?;
        Ok(SubmitOutcome::Submitted(reviews))
    }
}
