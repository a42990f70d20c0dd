//! Domain entities, validation rules, services, and ports.
//!
//! Everything here is transport and storage agnostic. Inbound adapters map
//! [`DomainError`] into HTTP responses; outbound adapters implement the
//! traits in [`ports`].

pub mod accounts_service;
pub mod error;
pub mod ports;
pub mod restaurant;
pub mod restaurant_service;
pub mod review;
pub mod review_service;
pub mod user;

pub use self::accounts_service::{AccountSession, AccountsService, RegisterAccount};
pub use self::error::{DomainError, ErrorCode};
pub use self::restaurant::{Restaurant, RestaurantDraft};
pub use self::restaurant_service::{MapView, RestaurantDetails, RestaurantService};
pub use self::review::Review;
pub use self::review_service::{ReviewService, SubmitReview};
pub use self::user::{UserRecord, Username};
