//! Driven adapters: flat-file persistence, image storage, password hashing.

pub mod images;
pub mod persistence;
pub mod security;
