//! # warden-service
//!
//! Business logic service layer for Warden. Each service orchestrates the
//! user store, credential primitives, token denylist and broker to
//! implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod mail;
pub mod session;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use account::{AccountService, Registration};
pub use mail::{LogMailer, SmtpMailer, VerificationTemplate};
pub use session::SessionService;
pub use user::UserRemovalService;
