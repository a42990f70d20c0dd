//! Restaurant map backend library.
//!
//! Hexagonal layout: `domain` holds entities, services, and ports; `inbound`
//! the HTTP adapter; `outbound` the flat-file, image, and password-hash
//! adapters; `server` the wiring.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::Trace;
