//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::types::id::TokenId;
use warden_entity::user::User;

use super::claims::Claims;

/// Creates signed session tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Issuer written into every token.
    issuer: String,
    /// Session token lifetime.
    ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let ttl = i64::try_from(config.jwt_ttl_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .unwrap_or(Duration::days(1));
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            ttl,
        }
    }

    /// Build the claims for a token issued to `user` at `now`.
    pub fn claims_for(&self, user: &User, now: DateTime<Utc>) -> Claims {
        Claims {
            sub: user.id,
            role: user.role,
            authorities: user
                .role
                .authorities()
                .iter()
                .map(|a| (*a).to_string())
                .collect(),
            name: user.name.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: TokenId::new(),
        }
    }

    /// Sign a set of claims.
    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))
    }
}
