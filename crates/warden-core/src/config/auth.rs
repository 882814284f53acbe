//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Issuer written into and required from every token.
    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,
    /// Session token TTL in minutes.
    #[serde(default = "default_token_ttl")]
    pub jwt_ttl_minutes: u64,
    /// Clock-skew leeway applied to expiry checks, in seconds.
    #[serde(default)]
    pub jwt_leeway_seconds: u64,
    /// Lifetime of a verification code in seconds.
    #[serde(default = "default_code_ttl")]
    pub verification_code_ttl_seconds: u64,
    /// Secret that grants the `ADMIN` role at registration. Unset means
    /// nobody can self-register as admin.
    #[serde(default)]
    pub admin_code: Option<String>,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_jwt_issuer(),
            jwt_ttl_minutes: default_token_ttl(),
            jwt_leeway_seconds: 0,
            verification_code_ttl_seconds: default_code_ttl(),
            admin_code: None,
            password_min_length: default_password_min(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_jwt_issuer() -> String {
    "warden".to_string()
}

fn default_token_ttl() -> u64 {
    120
}

fn default_code_ttl() -> u64 {
    15 * 60
}

fn default_password_min() -> usize {
    1
}
