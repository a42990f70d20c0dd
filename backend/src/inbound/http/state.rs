//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the domain services and remain testable without real storage.

use std::sync::Arc;

use crate::domain::{AccountsService, RestaurantService, ReviewService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<AccountsService>,
    pub restaurants: Arc<RestaurantService>,
    pub reviews: Arc<ReviewService>,
}

impl HttpState {
    /// Bundle the three domain services for handler injection.
    pub fn new(
        accounts: Arc<AccountsService>,
        restaurants: Arc<RestaurantService>,
        reviews: Arc<ReviewService>,
    ) -> Self {
        Self {
            accounts,
            restaurants,
            reviews,
        }
    }
}
