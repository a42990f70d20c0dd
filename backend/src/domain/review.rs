//! Reviews and the derived restaurant rating.

use serde::Serialize;

use super::user::Username;

/// Text stored when a review is submitted with a blank comment.
pub const NO_COMMENT: &str = "No comment";

/// Posted review. Append-only; never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Name of the reviewed restaurant, exactly as stored on its record.
    pub restaurant_name: String,
    /// Author username.
    pub username: Username,
    /// Submitted rating. The original application applies no range check
    /// and neither do we; only integer shape is enforced at the edge.
    pub rating: i64,
    /// Review text, or [`NO_COMMENT`] when left blank.
    pub comment: String,
}

impl Review {
    /// Build a review, substituting the sentinel for blank comments.
    pub fn new(
        restaurant_name: impl Into<String>,
        username: Username,
        rating: i64,
        comment: impl Into<String>,
    ) -> Self {
        let comment = comment.into();
        let comment = if comment.trim().is_empty() {
            NO_COMMENT.to_owned()
        } else {
            comment.trim().to_owned()
        };
        Self {
            restaurant_name: restaurant_name.into(),
            username,
            rating,
            comment,
        }
    }
}

/// Recompute a restaurant's derived rating: the arithmetic mean of all
/// reviews whose restaurant name matches exactly (case-sensitive), rounded
/// to one decimal place. Rounding is half-away-from-zero (`f64::round`).
/// Zero matching reviews yields 0.
pub fn average_rating(restaurant_name: &str, reviews: &[Review]) -> f64 {
    let ratings: Vec<i64> = reviews
        .iter()
        .filter(|review| review.restaurant_name == restaurant_name)
        .map(|review| review.rating)
        .collect();
    if ratings.is_empty() {
        return 0.0;
    }
    #[expect(clippy::cast_precision_loss, reason = "ratings are small integers")]
    let mean = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}
