//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::types::id::UserId;

use super::role::UserRole;
use super::verification::VerificationCode;

/// A registered account.
///
/// An enabled user never carries a verification code or expiry. A
/// disabled user carries both or neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique display name.
    pub name: String,
    /// Unique, normalised email address.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role.
    pub role: UserRole,
    /// Whether the email was verified and the account may log in.
    pub enabled: bool,
    /// Pending verification code.
    #[serde(skip_serializing)]
    pub verification_code: Option<String>,
    /// When the pending verification code expires.
    pub verification_code_expires_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The pending verification code, if the account has one.
    pub fn pending_code(&self) -> Option<VerificationCode> {
        match (&self.verification_code, self.verification_code_expires_at) {
            (Some(code), Some(expires_at)) => Some(VerificationCode {
                code: code.clone(),
                expires_at,
            }),
            _ => None,
        }
    }

    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the enabled/code fields are in a legal combination.
    pub fn is_consistent(&self) -> bool {
        let has_code = self.verification_code.is_some();
        let has_expiry = self.verification_code_expires_at.is_some();
        if self.enabled {
            !has_code && !has_expiry
        } else {
            has_code == has_expiry
        }
    }
}

/// Data required to create a new, unverified user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Desired display name.
    pub name: String,
    /// Normalised email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
    /// First verification code.
    pub verification: VerificationCode,
}

impl NewUser {
    /// Build the stored record with a fresh id.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            enabled: false,
            verification_code: Some(self.verification.code),
            verification_code_expires_at: Some(self.verification.expires_at),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Normalise an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
