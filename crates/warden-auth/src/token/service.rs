//! Issue, validate and revoke session tokens.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use warden_cache::keys;
use warden_cache::provider::CacheManager;
use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::CacheProvider;
use warden_entity::user::User;

use crate::jwt::{Claims, JwtDecoder, JwtEncoder};

/// A freshly signed token and the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Claims encoded in `token`.
    pub claims: Claims,
}

impl IssuedToken {
    /// Expiry instant of the token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}

/// Signs session tokens and keeps the shared denylist of revoked ones.
///
/// Tokens verify by signature alone; the denylist is the only server-side
/// session state. An entry lives exactly as long as the token it revokes.
#[derive(Debug, Clone)]
pub struct TokenService {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    cache: Arc<CacheManager>,
    leeway_seconds: u64,
}

impl TokenService {
    /// Creates a new token service.
    pub fn new(config: &AuthConfig, cache: Arc<CacheManager>) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            cache,
            leeway_seconds: config.jwt_leeway_seconds,
        }
    }

    /// Issue a token for an authenticated user.
    ///
    /// Disabled accounts are refused, whatever the caller checked.
    pub fn issue(&self, user: &User) -> AppResult<IssuedToken> {
        if !user.enabled {
            return Err(AppError::invalid_credentials("Incorrect username or password"));
        }
        let claims = self.encoder.claims_for(user, Utc::now());
        let token = self.encoder.encode(&claims)?;
        debug!(user_id = %user.id, jti = %claims.jti, "Issued session token");
        Ok(IssuedToken { token, claims })
    }

    /// Validate a token: signature and structure, then expiry, then the
    /// denylist.
    pub async fn validate(&self, token: &str) -> AppResult<Claims> {
        let claims = self.decoder.decode(token)?;
        let key = keys::denylisted_token(&claims.jti.to_string());
        if self.cache.exists(&key).await? {
            return Err(AppError::revoked_token("Token has been revoked"));
        }
        Ok(claims)
    }

    /// Revoke a token until its natural expiry.
    ///
    /// Revoking twice is the same as revoking once. Tokens that are malformed,
    /// forged or already expired are ignored; only a cache failure is an
    /// error.
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        let claims = match self.decoder.decode_ignoring_expiry(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Ignoring revoke of unverifiable token");
                return Ok(());
            }
        };

        let remaining = claims
            .remaining_ttl_seconds(Utc::now())
            .saturating_add(self.leeway_seconds);
        if remaining == 0 {
            debug!(jti = %claims.jti, "Ignoring revoke of expired token");
            return Ok(());
        }

        let key = keys::denylisted_token(&claims.jti.to_string());
        self.cache
            .set(&key, &claims.sub.to_string(), Duration::from_secs(remaining))
            .await?;
        info!(user_id = %claims.sub, jti = %claims.jti, ttl_seconds = remaining, "Token revoked");
        Ok(())
    }
}
