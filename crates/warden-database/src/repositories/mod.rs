//! User repository trait and its implementations.

pub mod memory;
pub mod user;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warden_core::result::AppResult;
use warden_core::types::id::UserId;
use warden_entity::user::{NewUser, User, VerificationCode};

pub use memory::MemoryUserRepository;
pub use user::PgUserRepository;

/// Durable user store.
///
/// Name and email lookups are exact; callers normalise the email before
/// calling. `create` and `save` fail with `Conflict` when another record
/// already holds the name or email.
#[async_trait]
pub trait UserRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new, unverified user.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by normalised email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<User>>;

    /// Overwrite an existing record. Fails with `NotFound` if it is gone.
    async fn save(&self, user: &User) -> AppResult<()>;

    /// Enable the account and clear its code, but only while it is still
    /// unverified, holds exactly `code`, and that code has not expired at
    /// `now`. Returns whether this call performed the transition.
    async fn activate(&self, id: UserId, code: &str, now: DateTime<Utc>) -> AppResult<bool>;

    /// Replace the pending code of an unverified account. Returns `false`
    /// when the account is missing or already enabled.
    async fn reissue_code(&self, id: UserId, code: &VerificationCode) -> AppResult<bool>;

    /// Remove a user. Returns whether a record was deleted.
    async fn delete_by_id(&self, id: UserId) -> AppResult<bool>;

    /// Check store connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}
