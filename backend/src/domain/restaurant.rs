//! Restaurant entity and submission validation.
//!
//! Validation is split in two: field-level checks over the submitted draft
//! (pure, no I/O) and cross-record duplicate checks against the existing
//! table. The duplicate-name check runs before the duplicate-location check
//! and the first failing check wins.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Two restaurants closer than this on both axes occupy the same place.
pub const LOCATION_TOLERANCE_DEG: f64 = 0.0001;

/// Registered restaurant. `rating` is the only mutable field; it is derived
/// from reviews and defaults to 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Display name, unique case-insensitively.
    pub name: String,
    /// Cuisine or venue type.
    pub kind: String,
    /// WGS84 latitude in [-90, 90].
    pub latitude: f64,
    /// WGS84 longitude in [-180, 180].
    pub longitude: f64,
    /// Street address.
    pub address: String,
    /// Contact phone number.
    pub phone: String,
    /// Owner name as submitted.
    pub owner: String,
    /// Average review rating rounded to one decimal place.
    pub rating: f64,
    /// Stored image file names, possibly empty.
    pub images: Vec<String>,
    /// Optional free-text description.
    pub description: String,
}

/// Unvalidated restaurant submission. Coordinates arrive as text so that
/// parse failures and range failures stay distinct errors.
#[derive(Debug, Clone, Default)]
pub struct RestaurantDraft {
    /// Display name.
    pub name: String,
    /// Cuisine or venue type.
    pub kind: String,
    /// Latitude as submitted.
    pub latitude: String,
    /// Longitude as submitted.
    pub longitude: String,
    /// Street address.
    pub address: String,
    /// Contact phone number.
    pub phone: String,
    /// Owner name.
    pub owner: String,
    /// Optional free-text description.
    pub description: String,
}

/// Field-level failures for a restaurant submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// One of name, type, address, or phone is blank after trimming.
    #[error("all required fields (excluding image and description) are mandatory")]
    MissingRequiredFields,
    /// Latitude or longitude failed to parse as a number.
    #[error("invalid format for latitude or longitude, please enter valid numbers")]
    CoordinatesNotNumeric,
    /// Latitude or longitude parsed but fell outside the WGS84 range.
    #[error("latitude must be between -90 and 90, and longitude must be between -180 and 180")]
    CoordinatesOutOfRange,
    /// Phone number did not match the accepted pattern.
    #[error("phone number format is incorrect")]
    InvalidPhone,
}

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        // Optional leading +, then digits, spaces, and hyphens only.
        let pattern = r"^\+?[\d\s-]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Draft that passed field validation, with parsed coordinates.
#[derive(Debug, Clone)]
pub struct ValidatedDraft {
    pub(crate) draft: RestaurantDraft,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
}

impl ValidatedDraft {
    /// Build the stored record from the validated draft and stored image
    /// file names. A fresh registration always starts at rating 0.
    pub fn into_restaurant(self, images: Vec<String>) -> Restaurant {
        let Self {
            draft,
            latitude,
            longitude,
        } = self;
        Restaurant {
            name: draft.name,
            kind: draft.kind,
            latitude,
            longitude,
            address: draft.address,
            phone: draft.phone,
            owner: draft.owner,
            rating: 0.0,
            images,
            description: draft.description,
        }
    }
}

impl RestaurantDraft {
    /// Run all field-level checks, collecting every failure.
    pub fn validate(mut self) -> Result<ValidatedDraft, Vec<FieldError>> {
        self.trim_fields();
        let mut errors = Vec::new();

        if [&self.name, &self.kind, &self.address, &self.phone]
            .iter()
            .any(|field| field.is_empty())
        {
            errors.push(FieldError::MissingRequiredFields);
        }

        let coordinates = match (
            self.latitude.parse::<f64>(),
            self.longitude.parse::<f64>(),
        ) {
            (Ok(lat), Ok(lon)) => {
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
                    Some((lat, lon))
                } else {
                    errors.push(FieldError::CoordinatesOutOfRange);
                    None
                }
            }
            _ => {
                errors.push(FieldError::CoordinatesNotNumeric);
                None
            }
        };

        if !phone_regex().is_match(&self.phone) {
            errors.push(FieldError::InvalidPhone);
        }

        match (coordinates, errors.is_empty()) {
            (Some((latitude, longitude)), true) => Ok(ValidatedDraft {
                draft: self,
                latitude,
                longitude,
            }),
            _ => Err(errors),
        }
    }

    fn trim_fields(&mut self) {
        for field in [
            &mut self.name,
            &mut self.kind,
            &mut self.latitude,
            &mut self.longitude,
            &mut self.address,
            &mut self.phone,
            &mut self.owner,
            &mut self.description,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_owned();
            }
        }
    }
}

/// Cross-record conflicts against the existing restaurant table.
#[derive(Debug, Clone, PartialEq)]
pub enum DuplicateConflict {
    /// Another restaurant already carries this name (case-insensitive).
    Name {
        /// Address of the existing restaurant with the same name.
        address: String,
    },
    /// Another restaurant sits within [`LOCATION_TOLERANCE_DEG`] on both axes.
    Location {
        /// Name of the existing restaurant at this location.
        name: String,
        /// Address of the existing restaurant at this location.
        address: String,
    },
}

/// Find the first duplicate conflict for a validated draft. The name check
/// is evaluated before the location check; no accumulation across the two.
pub fn find_duplicate(draft: &ValidatedDraft, existing: &[Restaurant]) -> Option<DuplicateConflict> {
    let candidate = draft.draft.name.to_lowercase();
    if let Some(found) = existing
        .iter()
        .find(|r| r.name.to_lowercase() == candidate)
    {
        return Some(DuplicateConflict::Name {
            address: found.address.clone(),
        });
    }

    existing
        .iter()
        .find(|r| {
            (r.latitude - draft.latitude).abs() < LOCATION_TOLERANCE_DEG
                && (r.longitude - draft.longitude).abs() < LOCATION_TOLERANCE_DEG
        })
        .map(|found| DuplicateConflict::Location {
            name: found.name.clone(),
            address: found.address.clone(),
        })
}
