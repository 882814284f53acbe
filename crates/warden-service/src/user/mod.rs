//! User removal driven by cross-service deletion requests.

pub mod removal;

pub use removal::UserRemovalService;
