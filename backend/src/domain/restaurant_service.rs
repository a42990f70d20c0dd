//! Restaurant registration, map browsing, and detail lookup.

use std::sync::Arc;

use serde_json::json;

use super::accounts_service::map_storage;
use super::error::DomainError;
use super::ports::{
    ImageIntakeError, ImageStore, ImageUpload, RestaurantRepository, ReviewRepository,
};
use super::restaurant::{DuplicateConflict, Restaurant, RestaurantDraft};
use super::review::Review;

/// Map focus used when no restaurant drives the view (central Taipei).
pub const DEFAULT_FOCUS: (f64, f64) = (25.0330, 121.5654);

/// Successful registration payload.
#[derive(Debug, Clone)]
pub struct RegisteredRestaurant {
    /// The created record, rating 0.
    pub restaurant: Restaurant,
    /// Degradation notice from the table read, if any.
    pub warning: Option<String>,
}

/// Map view over the restaurant table.
#[derive(Debug, Clone)]
pub struct MapView {
    /// Restaurants matching the search, or all of them.
    pub restaurants: Vec<Restaurant>,
    /// Focus latitude.
    pub latitude: f64,
    /// Focus longitude.
    pub longitude: f64,
    /// Degradation notice from the table read, if any.
    pub warning: Option<String>,
}

/// One restaurant with its reviews.
#[derive(Debug, Clone)]
pub struct RestaurantDetails {
    /// The stored record.
    pub restaurant: Restaurant,
    /// Reviews posted for it, in submission order.
    pub reviews: Vec<Review>,
    /// Degradation notice from either table read, if any.
    pub warning: Option<String>,
}

/// Restaurant service owning registration and read flows.
pub struct RestaurantService {
    restaurants: Arc<dyn RestaurantRepository>,
    reviews: Arc<dyn ReviewRepository>,
    images: Arc<dyn ImageStore>,
}

impl RestaurantService {
    /// Create a service over the given repositories and image store.
    pub fn new(
        restaurants: Arc<dyn RestaurantRepository>,
        reviews: Arc<dyn ReviewRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            restaurants,
            reviews,
            images,
        }
    }

    /// Register a restaurant: field validation, then the duplicate checks
    /// (name before location, first failure wins), then image intake, then
    /// the table append. Nothing is persisted on a validation or conflict
    /// failure.
    pub fn register(
        &self,
        draft: RestaurantDraft,
        uploads: Vec<ImageUpload>,
    ) -> Result<RegisteredRestaurant, DomainError> {
        let validated = draft.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            DomainError::validation(messages.join("; "))
                .with_details(json!({ "errors": messages }))
        })?;

        let existing = self.restaurants.load();
        match super::restaurant::find_duplicate(&validated, &existing.rows) {
            Some(DuplicateConflict::Name { address }) => {
                return Err(DomainError::conflict(format!(
                    "Registration failed! A restaurant with the same name already exists at: \
                     Address: {address}. Please choose a different name."
                ))
                .with_details(json!({ "conflict": "name", "address": address })));
            }
            Some(DuplicateConflict::Location { name, address }) => {
                return Err(DomainError::conflict(format!(
                    "Registration failed! This location is already registered by: Name: {name}, \
                     Address: {address}. Please confirm the location and try again."
                ))
                .with_details(json!({ "conflict": "location", "name": name, "address": address })));
            }
            None => {}
        }

        let mut stored = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            let image = self.images.accept(upload).map_err(map_image_error)?;
            stored.push(image.file_name);
        }

        let restaurant = validated.into_restaurant(stored);
        self.restaurants.append(&restaurant).map_err(map_storage)?;
        Ok(RegisteredRestaurant {
            restaurant,
            warning: existing.warning,
        })
    }

    /// Build the map view. A non-empty search filters restaurants by
    /// case-insensitive substring and focuses the first match; otherwise the
    /// requested or default focus is used.
    pub fn map_view(
        &self,
        search: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> MapView {
        let loaded = self.restaurants.load();
        let (mut focus_lat, mut focus_lon) = (
            latitude.unwrap_or(DEFAULT_FOCUS.0),
            longitude.unwrap_or(DEFAULT_FOCUS.1),
        );

        let restaurants = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                let matches: Vec<Restaurant> = loaded
                    .rows
                    .into_iter()
                    .filter(|r| r.name.to_lowercase().contains(&needle))
                    .collect();
                if let Some(first) = matches.first() {
                    focus_lat = first.latitude;
                    focus_lon = first.longitude;
                }
                matches
            }
            None => loaded.rows,
        };

        MapView {
            restaurants,
            latitude: focus_lat,
            longitude: focus_lon,
            warning: loaded.warning,
        }
    }

    /// Fetch one restaurant and its reviews by exact stored name.
    pub fn details(&self, name: &str) -> Result<RestaurantDetails, DomainError> {
        let loaded = self.restaurants.load();
        let restaurant = loaded
            .rows
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| DomainError::not_found(format!("Restaurant '{name}' not found.")))?;

        let reviews = self.reviews.load();
        let matching: Vec<Review> = reviews
            .rows
            .into_iter()
            .filter(|review| review.restaurant_name == restaurant.name)
            .collect();

        Ok(RestaurantDetails {
            restaurant,
            reviews: matching,
            warning: merge_warnings(loaded.warning, reviews.warning),
        })
    }
}

fn merge_warnings(first: Option<String>, second: Option<String>) -> Option<String> {
    match (first, second) {
        (Some(a), Some(b)) => Some(format!("{a}; {b}")),
        (a, b) => a.or(b),
    }
}

fn map_image_error(err: ImageIntakeError) -> DomainError {
    match err {
        ImageIntakeError::UnsupportedFormat | ImageIntakeError::TooLarge { .. } => {
            DomainError::validation(err.to_string())
        }
        ImageIntakeError::Processing { .. } => DomainError::image_processing(err.to_string()),
        ImageIntakeError::Io { .. } => DomainError::storage(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::test_support::{
        MemoryImageStore, MemoryRestaurantRepository, MemoryReviewRepository,
    };
    use crate::domain::user::Username;

    fn draft(name: &str, latitude: &str, longitude: &str) -> RestaurantDraft {
        RestaurantDraft {
            name: name.to_owned(),
            kind: "noodles".to_owned(),
            latitude: latitude.to_owned(),
            longitude: longitude.to_owned(),
            address: "1 Main Street".to_owned(),
            phone: "0912 345 678".to_owned(),
            owner: "pat".to_owned(),
            description: "open late".to_owned(),
        }
    }

    fn service() -> (
        Arc<MemoryRestaurantRepository>,
        Arc<MemoryReviewRepository>,
        Arc<MemoryImageStore>,
        RestaurantService,
    ) {
        let restaurants = Arc::new(MemoryRestaurantRepository::default());
        let reviews = Arc::new(MemoryReviewRepository::default());
        let images = Arc::new(MemoryImageStore::default());
        let svc = RestaurantService::new(restaurants.clone(), reviews.clone(), images.clone());
        (restaurants, reviews, images, svc)
    }

    #[test]
    fn registration_creates_record_with_zero_rating() {
        let (repo, _, _, svc) = service();
        let created = svc
            .register(draft("Shin Yeh", "25.0330", "121.5654"), Vec::new())
            .expect("registration succeeds");
        assert!((created.restaurant.rating - 0.0).abs() < f64::EPSILON);
        assert_eq!(repo.load().rows.len(), 1);
    }

    #[test]
    fn duplicate_name_reports_existing_address() {
        let (_, _, _, svc) = service();
        svc.register(draft("Shin Yeh", "25.0330", "121.5654"), Vec::new())
            .expect("first registration succeeds");
        let err = svc
            .register(draft("shin yeh", "24.0", "120.0"), Vec::new())
            .expect_err("name conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert!(err.message().contains("1 Main Street"));
    }

    #[test]
    fn duplicate_location_reports_existing_name() {
        let (_, _, _, svc) = service();
        svc.register(draft("Shin Yeh", "25.0330", "121.5654"), Vec::new())
            .expect("first registration succeeds");
        let err = svc
            .register(draft("Other Place", "25.03301", "121.56541"), Vec::new())
            .expect_err("location conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert!(err.message().contains("Shin Yeh"));
    }

    #[test]
    fn out_of_range_latitude_rejects_regardless_of_other_fields() {
        let (repo, _, images, svc) = service();
        let err = svc
            .register(
                draft("Shin Yeh", "95.0", "121.5654"),
                vec![ImageUpload {
                    filename: "front.png".to_owned(),
                    bytes: vec![0u8; 16],
                }],
            )
            .expect_err("out of range rejected");
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert!(repo.load().rows.is_empty(), "nothing persisted");
        assert!(
            images.accepted.lock().expect("images").is_empty(),
            "image intake never ran"
        );
    }

    #[test]
    fn accepted_images_are_joined_onto_the_record() {
        let (_, _, _, svc) = service();
        let uploads = vec![
            ImageUpload {
                filename: "a.png".to_owned(),
                bytes: vec![0u8; 8],
            },
            ImageUpload {
                filename: "b.jpg".to_owned(),
                bytes: vec![0u8; 8],
            },
        ];
        let created = svc
            .register(draft("Shin Yeh", "25.0330", "121.5654"), uploads)
            .expect("registration succeeds");
        assert_eq!(created.restaurant.images.len(), 2);
        for name in &created.restaurant.images {
            assert!(name.ends_with(".jpg"));
            assert!(!name.contains(','), "delimiter must not appear in names");
        }
    }

    #[test]
    fn map_view_search_focuses_first_match() {
        let (_, _, _, svc) = service();
        svc.register(draft("Shin Yeh", "25.0330", "121.5654"), Vec::new())
            .expect("first registration");
        svc.register(draft("Old Wang Noodles", "24.1500", "120.6600"), Vec::new())
            .expect("second registration");

        let view = svc.map_view(Some("wang"), None, None);
        assert_eq!(view.restaurants.len(), 1);
        assert!((view.latitude - 24.1500).abs() < f64::EPSILON);

        let everything = svc.map_view(None, None, None);
        assert_eq!(everything.restaurants.len(), 2);
        assert!((everything.latitude - DEFAULT_FOCUS.0).abs() < f64::EPSILON);
    }

    #[test]
    fn map_view_with_no_match_is_empty_at_default_focus() {
        let (_, _, _, svc) = service();
        svc.register(draft("Shin Yeh", "25.0330", "121.5654"), Vec::new())
            .expect("registration");
        let view = svc.map_view(Some("pizza"), None, None);
        assert!(view.restaurants.is_empty());
        assert!((view.latitude - DEFAULT_FOCUS.0).abs() < f64::EPSILON);
    }

    #[test]
    fn details_returns_matching_reviews_only() {
        let (_, reviews, _, svc) = service();
        svc.register(draft("Shin Yeh", "25.0330", "121.5654"), Vec::new())
            .expect("registration");
        let critic = Username::new("critic").expect("valid username");
        reviews
            .append(&Review::new("Shin Yeh", critic.clone(), 5, "great"))
            .expect("append");
        reviews
            .append(&Review::new("Elsewhere", critic, 1, "bad"))
            .expect("append");

        let details = svc.details("Shin Yeh").expect("details found");
        assert_eq!(details.reviews.len(), 1);
        assert_eq!(details.reviews[0].comment, "great");
    }

    #[test]
    fn unknown_restaurant_is_not_found() {
        let (_, _, _, svc) = service();
        let err = svc.details("Nowhere").expect_err("missing restaurant");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
