//! CSV-backed implementations of the repository ports.
//!
//! Each repository maps between its serde row type (field names are the
//! exact CSV headers) and the domain entity. Rows that fail entity
//! validation on read are skipped with a log line rather than poisoning
//! the whole table.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::ports::{
    Loaded, RestaurantRepository, ReviewRepository, StorageError, UserRepository,
};
use crate::domain::restaurant::Restaurant;
use crate::domain::review::Review;
use crate::domain::user::{UserRecord, Username};

use super::tables::{CsvTables, RESTAURANTS, REVIEWS, USERS};

/// Delimiter joining stored image file names on a restaurant row.
const IMAGE_DELIMITER: char = ',';

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRow {
    username: String,
    password: String,
}

impl From<&UserRecord> for UserRow {
    fn from(record: &UserRecord) -> Self {
        Self {
            username: record.username.to_string(),
            password: record.password_hash.clone(),
        }
    }
}

impl UserRow {
    fn into_record(self) -> Option<UserRecord> {
        match Username::new(&self.username) {
            Ok(username) => Some(UserRecord {
                username,
                password_hash: self.password.trim().to_owned(),
            }),
            Err(err) => {
                warn!(row = %self.username, error = %err, "skipping invalid user row");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RestaurantRow {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    latitude: f64,
    longitude: f64,
    address: String,
    phone: String,
    owner: String,
    rating: f64,
    #[serde(default)]
    image: String,
    #[serde(default)]
    description: String,
}

impl From<&Restaurant> for RestaurantRow {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            name: restaurant.name.clone(),
            kind: restaurant.kind.clone(),
            latitude: restaurant.latitude,
            longitude: restaurant.longitude,
            address: restaurant.address.clone(),
            phone: restaurant.phone.clone(),
            owner: restaurant.owner.clone(),
            rating: restaurant.rating,
            image: restaurant.images.join(&IMAGE_DELIMITER.to_string()),
            description: restaurant.description.clone(),
        }
    }
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        let images = row
            .image
            .split(IMAGE_DELIMITER)
            .filter(|part| !part.is_empty())
            .map(str::to_owned)
            .collect();
        Self {
            name: row.name,
            kind: row.kind,
            latitude: row.latitude,
            longitude: row.longitude,
            address: row.address,
            phone: row.phone,
            owner: row.owner,
            rating: row.rating,
            images,
            description: row.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReviewRow {
    restaurant_name: String,
    username: String,
    rating: i64,
    comment: String,
}

impl From<&Review> for ReviewRow {
    fn from(review: &Review) -> Self {
        Self {
            restaurant_name: review.restaurant_name.clone(),
            username: review.username.to_string(),
            rating: review.rating,
            comment: review.comment.clone(),
        }
    }
}

impl ReviewRow {
    fn into_review(self) -> Option<Review> {
        match Username::new(&self.username) {
            Ok(username) => Some(Review {
                restaurant_name: self.restaurant_name,
                username,
                rating: self.rating,
                comment: self.comment,
            }),
            Err(err) => {
                warn!(
                    restaurant = %self.restaurant_name,
                    error = %err,
                    "skipping review row without author"
                );
                None
            }
        }
    }
}

/// Users table over `users.csv`.
#[derive(Debug, Clone)]
pub struct CsvUserRepository {
    tables: CsvTables,
}

impl CsvUserRepository {
    /// Create a repository over the given store.
    pub fn new(tables: CsvTables) -> Self {
        Self { tables }
    }
}

impl UserRepository for CsvUserRepository {
    fn load(&self) -> Loaded<UserRecord> {
        let loaded: Loaded<UserRow> = self.tables.load(&USERS);
        Loaded {
            rows: loaded
                .rows
                .into_iter()
                .filter_map(UserRow::into_record)
                .collect(),
            warning: loaded.warning,
        }
    }

    fn append(&self, user: &UserRecord) -> Result<(), StorageError> {
        self.tables.append(&USERS, UserRow::from(user)).map(|_| ())
    }
}

/// Restaurants table over `restaurants.csv`.
#[derive(Debug, Clone)]
pub struct CsvRestaurantRepository {
    tables: CsvTables,
}

impl CsvRestaurantRepository {
    /// Create a repository over the given store.
    pub fn new(tables: CsvTables) -> Self {
        Self { tables }
    }
}

impl RestaurantRepository for CsvRestaurantRepository {
    fn load(&self) -> Loaded<Restaurant> {
        let loaded: Loaded<RestaurantRow> = self.tables.load(&RESTAURANTS);
        Loaded {
            rows: loaded.rows.into_iter().map(Restaurant::from).collect(),
            warning: loaded.warning,
        }
    }

    fn append(&self, restaurant: &Restaurant) -> Result<(), StorageError> {
        self.tables
            .append(&RESTAURANTS, RestaurantRow::from(restaurant))
            .map(|_| ())
    }

    fn update_rating(&self, name: &str, rating: f64) -> Result<(), StorageError> {
        self.tables.update(&RESTAURANTS, |row: &mut RestaurantRow| {
            if row.name == name {
                row.rating = rating;
            }
        })
    }
}

/// Reviews table over `reviews.csv`.
#[derive(Debug, Clone)]
pub struct CsvReviewRepository {
    tables: CsvTables,
}

impl CsvReviewRepository {
    /// Create a repository over the given store.
    pub fn new(tables: CsvTables) -> Self {
        Self { tables }
    }
}

impl ReviewRepository for CsvReviewRepository {
    fn load(&self) -> Loaded<Review> {
        let loaded: Loaded<ReviewRow> = self.tables.load(&REVIEWS);
        Loaded {
            rows: loaded
                .rows
                .into_iter()
                .filter_map(ReviewRow::into_review)
                .collect(),
            warning: loaded.warning,
        }
    }

    fn append(&self, review: &Review) -> Result<Vec<Review>, StorageError> {
        let rows = self.tables.append(&REVIEWS, ReviewRow::from(review))?;
        Ok(rows.into_iter().filter_map(ReviewRow::into_review).collect())
    }
}
