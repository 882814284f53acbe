//! Session service: credentials in, signed token out.

use std::sync::Arc;

use tracing::{info, warn};

use warden_auth::{Claims, IssuedToken, PasswordHasher, TokenService};
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_database::UserRepository;
use warden_entity::user::model::normalize_email;

const BAD_CREDENTIALS: &str = "Incorrect username or password";

/// Authenticates users and manages the lifetime of their tokens.
#[derive(Debug, Clone)]
pub struct SessionService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Authenticate with email and password and issue a session token.
    ///
    /// Unknown email, wrong password and unverified account all fail the
    /// same way.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<IssuedToken> {
        let Some(user) = self.users.find_by_email(&normalize_email(email)).await? else {
            return Err(AppError::invalid_credentials(BAD_CREDENTIALS));
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::invalid_credentials(BAD_CREDENTIALS));
        }
        if !user.enabled {
            info!(user_id = %user.id, "Login rejected: account not verified");
            return Err(AppError::invalid_credentials(BAD_CREDENTIALS));
        }

        let issued = self.tokens.issue(&user)?;
        info!(user_id = %user.id, jti = %issued.claims.jti, "User logged in");
        Ok(issued)
    }

    /// End the session carried by `token`.
    ///
    /// Always succeeds from the caller's point of view. The token may be
    /// missing, prefixed with `Bearer `, garbage or already expired.
    pub async fn logout(&self, token: Option<&str>) {
        let Some(token) = token.map(strip_bearer).filter(|t| !t.is_empty()) else {
            return;
        };
        if let Err(e) = self.tokens.revoke(token).await {
            warn!(error = %e, "Failed to revoke token on logout");
        }
    }

    /// Validate a presented token and return its claims.
    pub async fn authenticate(&self, token: &str) -> AppResult<Claims> {
        self.tokens.validate(strip_bearer(token)).await
    }
}

fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    token
        .strip_prefix("Bearer ")
        .or_else(|| token.strip_prefix("bearer "))
        .unwrap_or(token)
        .trim()
}
