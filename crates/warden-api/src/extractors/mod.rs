//! Custom Axum extractors.

pub mod auth;
pub mod json;

pub use auth::{AuthClaims, BearerToken};
pub use json::ValidatedJson;
