//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    #[validate(length(min = 1, max = 64, message = "Name is required"))]
    pub name: String,
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Optional admin secret.
    #[serde(default, alias = "code")]
    pub admin_code: Option<String>,
}

/// Verification request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyRequest {
    /// Email the code was sent to.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Six-digit code.
    #[serde(alias = "verificationCode")]
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
}

/// Resend request; the email may come from the body or the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResendRequest {
    /// Email of the unverified account.
    #[serde(default)]
    pub email: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}
