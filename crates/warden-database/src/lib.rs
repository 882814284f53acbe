//! # warden-database
//!
//! User store for Warden: PostgreSQL connection management, migrations,
//! and the [`UserRepository`] implementations.
//!
//! Uniqueness of name and email is enforced by the store itself, never by
//! a check-then-insert in the caller.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{MemoryUserRepository, PgUserRepository, UserRepository};
