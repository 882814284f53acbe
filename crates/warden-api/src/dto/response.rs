//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_auth::{Claims, IssuedToken};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed session token.
    pub token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Token expiration.
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        let expires_at = issued.expires_at();
        Self {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at,
        }
    }
}

/// The caller's identity as carried by their token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub name: String,
    pub role: String,
    pub authorities: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for MeResponse {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub.into_uuid(),
            expires_at: claims.expires_at(),
            role: claims.role.to_string(),
            name: claims.name,
            authorities: claims.authorities,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answered, `degraded` otherwise.
    pub status: String,
    /// Server version.
    pub version: String,
    /// User store status.
    pub store: String,
    /// Denylist cache status.
    pub cache: String,
}
