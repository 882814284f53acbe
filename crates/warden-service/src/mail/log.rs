//! Mailer that only writes to the log.

use async_trait::async_trait;
use tracing::{debug, info};

use warden_core::result::AppResult;
use warden_core::traits::{Mailer, OutboundEmail};

/// Stands in for SMTP when email delivery is disabled.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> AppResult<()> {
        info!(to = %email.to, subject = %email.subject, "Email delivery disabled, not sending");
        debug!(to = %email.to, body = %email.text_body, "Suppressed email body");
        Ok(())
    }
}
