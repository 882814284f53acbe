//! # warden-auth
//!
//! Credential handling and session tokens for Warden.
//!
//! ## Modules
//!
//! - `password`: Argon2id password hashing and length policy
//! - `verification`: one-time email verification codes
//! - `jwt`: JWT claims, signing and validation
//! - `token`: issue, validate and revoke session tokens against the denylist

pub mod jwt;
pub mod password;
pub mod token;
pub mod verification;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use token::{IssuedToken, TokenService};
pub use verification::CodeGenerator;
