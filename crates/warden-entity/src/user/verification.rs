//! Verification code value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A 6-digit email verification code and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Six decimal digits.
    pub code: String,
    /// Absolute expiry. The code is rejected at or after this instant.
    pub expires_at: DateTime<Utc>,
}

impl VerificationCode {
    /// Whether the code is expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
