//! Outbound email trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
    /// Plain-text alternative.
    pub text_body: String,
}

/// Delivers emails. Implementations must bound how long a send can take.
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug + 'static {
    /// Send one email.
    async fn send(&self, email: &OutboundEmail) -> AppResult<()>;
}
