//! Login, logout and token authentication.

pub mod service;

pub use service::SessionService;
