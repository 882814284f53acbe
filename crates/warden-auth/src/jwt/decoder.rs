//! JWT signature and expiry validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use warden_core::config::AuthConfig;
use warden_core::error::AppError;

use super::claims::Claims;

/// Validates session token signatures and expiry.
///
/// The denylist is not consulted here; see `TokenService`.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Full validation: signature, issuer, expiry.
    validation: Validation,
    /// Same as `validation` but with expiry unchecked.
    signature_only: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.jwt_leeway_seconds;
        validation.set_issuer(&[config.jwt_issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let mut signature_only = validation.clone();
        signature_only.validate_exp = false;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            signature_only,
        }
    }

    /// Decode a token, checking signature, structure, issuer and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::expired_token("Token has expired"),
                JwtErrorKind::InvalidSignature => AppError::invalid_token("Invalid token signature"),
                _ => AppError::invalid_token(format!("Invalid token: {e}")),
            })
    }

    /// Decode a token whose signature verifies, even if it has expired.
    pub fn decode_ignoring_expiry(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.signature_only)
            .map(|data| data.claims)
            .map_err(|e| AppError::invalid_token(format!("Invalid token: {e}")))
    }
}
