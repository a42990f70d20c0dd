//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::web;

use crate::domain::ports::test_support::{
    MemoryImageStore, MemoryRestaurantRepository, MemoryReviewRepository, MemoryUserRepository,
    PlainHasher,
};
use crate::domain::{AccountsService, RestaurantService, ReviewService};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Build handler state over in-memory fakes and a plaintext hasher.
pub fn test_state() -> web::Data<HttpState> {
    let users = Arc::new(MemoryUserRepository::default());
    let restaurants = Arc::new(MemoryRestaurantRepository::default());
    let reviews = Arc::new(MemoryReviewRepository::default());
    let images = Arc::new(MemoryImageStore::default());

    let accounts = Arc::new(AccountsService::new(users, Arc::new(PlainHasher)));
    let restaurant_service = Arc::new(RestaurantService::new(
        restaurants.clone(),
        reviews.clone(),
        images,
    ));
    let review_service = Arc::new(ReviewService::new(restaurants, reviews));
    web::Data::new(HttpState::new(accounts, restaurant_service, review_service))
}
