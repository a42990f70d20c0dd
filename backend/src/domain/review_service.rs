//! Review submission and the synchronous rating recompute.
//!
//! Submission walks Authenticated -> Validated -> Appended ->
//! RatingRecomputed -> Persisted. A failure before the append mutates
//! nothing; the append and the rating rewrite are two separate whole-table
//! writes and are not atomic with each other.

use std::sync::Arc;

use super::accounts_service::map_storage;
use super::error::DomainError;
use super::ports::{RestaurantRepository, ReviewRepository};
use super::review::{self, Review};
use super::user::Username;

/// Review submission as collected by the inbound adapter.
#[derive(Debug, Clone)]
pub struct SubmitReview {
    /// Exact stored name of the reviewed restaurant.
    pub restaurant_name: String,
    /// Submitted rating.
    pub rating: i64,
    /// Review text; blank becomes the sentinel comment.
    pub comment: String,
}

/// Successful submission payload.
#[derive(Debug, Clone)]
pub struct SubmittedReview {
    /// The stored review.
    pub review: Review,
    /// The restaurant's recomputed average rating.
    pub new_rating: f64,
}

/// Review service owning the submission flow.
pub struct ReviewService {
    restaurants: Arc<dyn RestaurantRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

impl ReviewService {
    /// Create a service over the given repositories.
    pub fn new(
        restaurants: Arc<dyn RestaurantRepository>,
        reviews: Arc<dyn ReviewRepository>,
    ) -> Self {
        Self {
            restaurants,
            reviews,
        }
    }

    /// Append a review for an existing restaurant, then recompute and
    /// persist the restaurant's average rating.
    pub fn submit(
        &self,
        author: Username,
        request: SubmitReview,
    ) -> Result<SubmittedReview, DomainError> {
        let known = self.restaurants.load();
        if !known
            .rows
            .iter()
            .any(|r| r.name == request.restaurant_name)
        {
            return Err(DomainError::not_found(format!(
                "Restaurant '{}' not found.",
                request.restaurant_name
            )));
        }

        let review = Review::new(
            request.restaurant_name.clone(),
            author,
            request.rating,
            request.comment,
        );
        let all_reviews = self.reviews.append(&review).map_err(map_storage)?;

        let new_rating = review::average_rating(&request.restaurant_name, &all_reviews);
        self.restaurants
            .update_rating(&request.restaurant_name, new_rating)
            .map_err(map_storage)?;

        Ok(SubmittedReview { review, new_rating })
    }
}
