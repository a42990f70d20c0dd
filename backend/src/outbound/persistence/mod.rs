//! Flat-file persistence adapters.

pub mod csv_repositories;
pub mod tables;

pub use csv_repositories::{CsvRestaurantRepository, CsvReviewRepository, CsvUserRepository};
pub use tables::CsvTables;
