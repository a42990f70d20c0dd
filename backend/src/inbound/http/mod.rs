//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod error;
pub mod images;
pub mod restaurants;
pub mod reviews;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
