//! Password policy enforcement for new passwords.

use warden_core::config::AuthConfig;
use warden_core::error::AppError;

/// Upper bound on accepted password length, in bytes.
const MAX_PASSWORD_BYTES: usize = 128;

/// Validates new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length, in characters.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Returns `Ok(())` if the password is acceptable, or an error
    /// describing the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.trim().is_empty() {
            return Err(AppError::validation("Password must not be blank"));
        }

        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::validation(format!(
                "Password must be at most {MAX_PASSWORD_BYTES} bytes long"
            )));
        }

        Ok(())
    }
}
