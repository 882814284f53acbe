//! JWT claims structure carried by every session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::types::id::{TokenId, UserId};
use warden_entity::user::UserRole;

/// JWT claims payload embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: UserId,
    /// User role at the time of token issuance.
    pub role: UserRole,
    /// Authorities granted by the role.
    pub authorities: Vec<String>,
    /// Display name for convenience.
    pub name: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// JWT ID for denylist tracking.
    pub jti: TokenId,
}

impl Claims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Returns the remaining lifetime in seconds (0 if expired).
    pub fn remaining_ttl_seconds(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from(self.exp - now.timestamp()).unwrap_or(0)
    }
}
