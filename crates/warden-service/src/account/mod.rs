//! Account registration and email verification.

pub mod service;

pub use service::{AccountService, Registration};
