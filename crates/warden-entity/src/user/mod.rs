//! User domain entities.

pub mod model;
pub mod role;
pub mod verification;

pub use model::{NewUser, User};
pub use role::UserRole;
pub use verification::VerificationCode;
