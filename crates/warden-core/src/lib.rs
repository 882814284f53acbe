//! # warden-core
//!
//! Core crate for the Warden authentication service. Contains the
//! collaborator traits, configuration schemas, typed identifiers,
//! lifecycle event payloads, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
