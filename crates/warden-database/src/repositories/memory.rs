//! In-memory user repository for single-node deployments and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::id::UserId;
use warden_entity::user::{NewUser, User, VerificationCode};

use super::UserRepository;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    by_name: HashMap<String, UserId>,
    by_email: HashMap<String, UserId>,
}

impl Tables {
    /// Whether `name` or `email` is held by a record other than `owner`.
    fn check_unique(&self, name: &str, email: &str, owner: Option<UserId>) -> AppResult<()> {
        if self.by_name.get(name).is_some_and(|id| Some(*id) != owner) {
            return Err(AppError::conflict("Name already in use"));
        }
        if self.by_email.get(email).is_some_and(|id| Some(*id) != owner) {
            return Err(AppError::conflict("Email already in use"));
        }
        Ok(())
    }
}

/// [`UserRepository`] held in process memory.
///
/// All three maps sit behind one lock so uniqueness checks and inserts are
/// a single critical section.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    tables: RwLock<Tables>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Whether the repository holds no users.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        tables.check_unique(&new_user.name, &new_user.email, None)?;

        let user = new_user.into_user(Utc::now());
        tables.by_name.insert(user.name.clone(), user.id);
        tables.by_email.insert(user.email.clone(), user.id);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_name
            .get(name)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.users.get(&user.id) else {
            return Err(AppError::not_found(format!("User {} not found", user.id)));
        };
        let (old_name, old_email) = (existing.name.clone(), existing.email.clone());
        tables.check_unique(&user.name, &user.email, Some(user.id))?;

        tables.by_name.remove(&old_name);
        tables.by_email.remove(&old_email);
        tables.by_name.insert(user.name.clone(), user.id);
        tables.by_email.insert(user.email.clone(), user.id);

        let mut stored = user.clone();
        stored.updated_at = Utc::now();
        tables.users.insert(user.id, stored);
        Ok(())
    }

    async fn activate(&self, id: UserId, code: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(false);
        };
        let matches = user
            .pending_code()
            .is_some_and(|pending| pending.code == code && !pending.is_expired_at(now));
        if user.enabled || !matches {
            return Ok(false);
        }
        user.enabled = true;
        user.verification_code = None;
        user.verification_code_expires_at = None;
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn reissue_code(&self, id: UserId, code: &VerificationCode) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) if !user.enabled => {
                user.verification_code = Some(code.code.clone());
                user.verification_code_expires_at = Some(code.expires_at);
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: UserId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.remove(&id) else {
            return Ok(false);
        };
        tables.by_name.remove(&user.name);
        tables.by_email.remove(&user.email);
        Ok(true)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
