//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the flat-file record store, the image store, the password hasher). Each
//! trait exposes strongly typed errors so adapters map their failures into
//! predictable variants. All adapters here are local file I/O or pure
//! computation, so the ports are synchronous; handlers run them on the
//! blocking pool.

use thiserror::Error;

use super::restaurant::Restaurant;
use super::review::Review;
use super::user::UserRecord;

/// A dataset read. Reads never fail outright: a missing or unreadable
/// backing file degrades to an empty table, with the condition reported
/// for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    /// Rows read from the backing file, possibly empty.
    pub rows: Vec<T>,
    /// Human-readable degradation notice when the read fell back to empty.
    pub warning: Option<String>,
}

impl<T> Loaded<T> {
    /// A table read cleanly from disk.
    pub fn clean(rows: Vec<T>) -> Self {
        Self {
            rows,
            warning: None,
        }
    }

    /// An empty table substituted for an unreadable file.
    pub fn degraded(warning: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            warning: Some(warning.into()),
        }
    }
}

/// Errors surfaced by record-store adapters on the write path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The whole-table rewrite failed; the caller's change was abandoned.
    #[error("failed to save {dataset}: {message}")]
    Write {
        /// Dataset file name.
        dataset: String,
        /// Underlying failure description.
        message: String,
    },
}

impl StorageError {
    /// Helper for write failures.
    pub fn write(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            dataset: dataset.into(),
            message: message.into(),
        }
    }
}

/// Persistence port for the users dataset.
pub trait UserRepository: Send + Sync {
    /// Load the full users table.
    fn load(&self) -> Loaded<UserRecord>;

    /// Append one user and rewrite the table.
    fn append(&self, user: &UserRecord) -> Result<(), StorageError>;
}

/// Persistence port for the restaurants dataset.
pub trait RestaurantRepository: Send + Sync {
    /// Load the full restaurants table.
    fn load(&self) -> Loaded<Restaurant>;

    /// Append one restaurant and rewrite the table.
    fn append(&self, restaurant: &Restaurant) -> Result<(), StorageError>;

    /// Set the derived rating on the named restaurant and rewrite the table.
    fn update_rating(&self, name: &str, rating: f64) -> Result<(), StorageError>;
}

/// Persistence port for the reviews dataset.
pub trait ReviewRepository: Send + Sync {
    /// Load the full reviews table.
    fn load(&self) -> Loaded<Review>;

    /// Append one review, rewrite the table, and return the updated table
    /// so the caller can recompute derived ratings from it.
    fn append(&self, review: &Review) -> Result<Vec<Review>, StorageError>;
}

/// An uploaded image prior to intake.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original client-side file name; only its extension is consulted.
    pub filename: String,
    /// Raw file bytes as declared by the client.
    pub bytes: Vec<u8>,
}

/// A normalised image persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Generated `{uuid}.jpg` file name, free of the list delimiter.
    pub file_name: String,
}

/// Failures raised by image intake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageIntakeError {
    /// Extension is not on the jpg/jpeg/png allow-list.
    #[error("only JPG, JPEG, and PNG images are allowed")]
    UnsupportedFormat,
    /// Declared content length exceeds the limit.
    #[error("image file is too large, maximum size allowed is {limit_bytes} bytes")]
    TooLarge {
        /// Maximum accepted size in bytes.
        limit_bytes: usize,
    },
    /// Decode or re-encode still failing after the retry budget.
    #[error("image processing failed: {message}")]
    Processing {
        /// Underlying decoder or encoder failure.
        message: String,
    },
    /// The converted image could not be written to the store.
    #[error("failed to store image: {message}")]
    Io {
        /// Underlying I/O failure.
        message: String,
    },
}

/// Intake port for uploaded restaurant photos.
pub trait ImageStore: Send + Sync {
    /// Validate, normalise, and persist one upload, returning the stored
    /// file name. Rejections happen before any disk write.
    fn accept(&self, upload: &ImageUpload) -> Result<StoredImage, ImageIntakeError>;
}

/// Failures raised by the password hasher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// Hashing or verification could not run.
    #[error("password hashing failed: {message}")]
    Hashing {
        /// Underlying failure description.
        message: String,
    },
}

/// Credential hashing port.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a PHC string.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Verify a plaintext password against a stored PHC string.
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}
