//! PostgreSQL user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::id::UserId;
use warden_entity::user::{NewUser, User, UserRole, VerificationCode};

use super::UserRepository;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, enabled, verification_code, \
     verification_code_expires_at, created_at, updated_at";

/// Row shape of the `users` table.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    enabled: bool,
    verification_code: Option<String>,
    verification_code_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: UserRole = row.role.parse().map_err(|_| {
            AppError::database(format!("Unknown role '{}' stored for user {}", row.role, row.id))
        })?;
        Ok(Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            enabled: row.enabled,
            verification_code: row.verification_code,
            verification_code_expires_at: row.verification_code_expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// [`UserRepository`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str, what: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, format!("Failed to find user by {what}"), e)
            })?
            .map(User::try_from)
            .transpose()
    }
}

/// Map a write error, turning unique violations into `Conflict`.
fn map_write_error(e: sqlx::Error, action: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = e {
        match db_err.constraint() {
            Some("users_name_key") => return AppError::conflict("Name already in use"),
            Some("users_email_key") => return AppError::conflict("Email already in use"),
            _ => {}
        }
    }
    AppError::with_source(ErrorKind::Database, format!("Failed to {action}"), e)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let user = new_user.into_user(Utc::now());
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id.into_uuid())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.enabled)
            .bind(&user.verification_code)
            .bind(user.verification_code_expires_at)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "create user"))?;
        User::try_from(row)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_one("email", email, "email").await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<User>> {
        self.find_one("name", name, "name").await
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, role = $5, enabled = $6, \
             verification_code = $7, verification_code_expires_at = $8, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user.id.into_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.enabled)
        .bind(&user.verification_code)
        .bind(user.verification_code_expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "update user"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {} not found", user.id)));
        }
        Ok(())
    }

    async fn activate(&self, id: UserId, code: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET enabled = TRUE, verification_code = NULL, \
             verification_code_expires_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND enabled = FALSE AND verification_code = $2 \
             AND verification_code_expires_at > $3",
        )
        .bind(id.into_uuid())
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to activate user", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn reissue_code(&self, id: UserId, code: &VerificationCode) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET verification_code = $2, verification_code_expires_at = $3, \
             updated_at = NOW() WHERE id = $1 AND enabled = FALSE",
        )
        .bind(id.into_uuid())
        .bind(&code.code)
        .bind(code.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to reissue verification code", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
