//! Cache key builders.
//!
//! The Redis provider prepends its configured prefix, so keys here are
//! relative.

/// Cache key marking a token id as revoked.
pub fn denylisted_token(jti: &str) -> String {
    format!("denylist:jti:{jti}")
}
