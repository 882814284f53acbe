//! Six-digit verification code generation.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use warden_entity::user::VerificationCode;

/// Smallest and largest codes; every code has exactly six digits.
const CODE_RANGE: std::ops::RangeInclusive<u32> = 100_000..=999_999;

/// Produces fresh verification codes with a fixed lifetime.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    ttl: Duration,
}

impl CodeGenerator {
    /// Create a generator whose codes live for `ttl_seconds`.
    pub fn new(ttl_seconds: u64) -> Self {
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self { ttl }
    }

    /// Draw a new code expiring `ttl` after `now`.
    pub fn generate(&self, now: DateTime<Utc>) -> VerificationCode {
        let value = rand::rng().random_range(CODE_RANGE);
        VerificationCode {
            code: value.to_string(),
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}
