//! Restaurant API handlers.
//!
//! ```text
//! POST /api/v1/restaurants           Register a restaurant (auth required)
//! GET  /api/v1/restaurants?name=...  Map view, optionally filtered
//! GET  /api/v1/restaurants/{name}    One record plus its reviews
//! ```
//!
//! Upload images travel inline as base64 fields; the adapter decodes them
//! before anything reaches the domain.

use actix_web::{HttpResponse, get, post, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::domain::ports::ImageUpload;
use crate::domain::{DomainError, Restaurant, RestaurantDraft, Review};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::blocking_cancelled;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// One inline image upload.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Client-side file name; only the extension is significant.
    pub filename: String,
    /// Base64-encoded file content.
    pub content: String,
}

/// Restaurant registration request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRestaurantRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Kept textual so parse failures stay a distinct validation error.
    pub latitude: String,
    pub longitude: String,
    pub address: String,
    pub phone: String,
    pub owner: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<ImagePayload>,
}

/// Registration response: the created record plus any storage-read warning.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantCreatedResponse {
    pub restaurant: Restaurant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Map view query string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQuery {
    /// Case-insensitive substring filter over restaurant names.
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Map view response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapViewResponse {
    pub restaurants: Vec<Restaurant>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Detail response: one record with its reviews.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDetailsResponse {
    pub restaurant: Restaurant,
    pub reviews: Vec<Review>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

fn decode_uploads(images: Vec<ImagePayload>) -> Result<Vec<ImageUpload>, DomainError> {
    images
        .into_iter()
        .map(|image| {
            let bytes = BASE64.decode(image.content.as_bytes()).map_err(|_| {
                DomainError::validation(format!(
                    "image '{}' content is not valid base64",
                    image.filename
                ))
            })?;
            Ok(ImageUpload {
                filename: image.filename,
                bytes,
            })
        })
        .collect()
}

/// Register a restaurant for the logged-in user.
#[post("/restaurants")]
pub async fn register_restaurant(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRestaurantRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user()?;

    let request = payload.into_inner();
    let uploads = decode_uploads(request.images)?;
    let draft = RestaurantDraft {
        name: request.name,
        kind: request.kind,
        latitude: request.latitude,
        longitude: request.longitude,
        address: request.address,
        phone: request.phone,
        owner: request.owner,
        description: request.description,
    };

    let restaurants = state.restaurants.clone();
    let created = web::block(move || restaurants.register(draft, uploads))
        .await
        .map_err(blocking_cancelled)??;

    Ok(HttpResponse::Created().json(RestaurantCreatedResponse {
        restaurant: created.restaurant,
        warning: created.warning,
    }))
}

/// Map view over the restaurant table, optionally filtered by name.
#[get("/restaurants")]
pub async fn map_view(
    state: web::Data<HttpState>,
    query: web::Query<MapQuery>,
) -> ApiResult<web::Json<MapViewResponse>> {
    let restaurants = state.restaurants.clone();
    let query = query.into_inner();
    let view = web::block(move || {
        restaurants.map_view(query.name.as_deref(), query.latitude, query.longitude)
    })
    .await
    .map_err(blocking_cancelled)?;

    Ok(web::Json(MapViewResponse {
        restaurants: view.restaurants,
        latitude: view.latitude,
        longitude: view.longitude,
        warning: view.warning,
    }))
}

/// One restaurant with its reviews, by exact stored name.
#[get("/restaurants/{name}")]
pub async fn restaurant_details(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RestaurantDetailsResponse>> {
    let restaurants = state.restaurants.clone();
    let name = path.into_inner();
    let details = web::block(move || restaurants.details(&name))
        .await
        .map_err(blocking_cancelled)??;

    Ok(web::Json(RestaurantDetailsResponse {
        restaurant: details.restaurant,
        reviews: details.reviews,
        warning: details.warning,
    }))
}
