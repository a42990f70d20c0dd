//! Review API handlers.
//!
//! ```text
//! POST /api/v1/restaurants/{name}/reviews {"rating":5,"comment":"great"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Review, SubmitReview};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::blocking_cancelled;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Review submission body. A missing or blank comment is stored as the
/// "No comment" sentinel.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

/// Submission response: the stored review and the recomputed rating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCreatedResponse {
    pub review: Review,
    pub new_rating: f64,
}

/// Post a review for an existing restaurant as the logged-in user.
#[post("/restaurants/{name}/reviews")]
pub async fn submit_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SubmitReviewRequest>,
) -> ApiResult<HttpResponse> {
    let author = session.require_user()?;

    let reviews = state.reviews.clone();
    let request = payload.into_inner();
    let restaurant_name = path.into_inner();
    let submitted = web::block(move || {
        reviews.submit(
            author,
            SubmitReview {
                restaurant_name,
                rating: request.rating,
                comment: request.comment,
            },
        )
    })
    .await
    .map_err(blocking_cancelled)??;

    Ok(HttpResponse::Created().json(ReviewCreatedResponse {
        review: submitted.review,
        new_rating: submitted.new_rating,
    }))
}
