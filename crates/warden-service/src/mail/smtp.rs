//! SMTP delivery through lettre's async transport.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use warden_core::config::EmailConfig;
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::traits::{Mailer, OutboundEmail};

/// Sends mail over an SMTP relay with STARTTLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .finish()
    }
}

impl SmtpMailer {
    /// Build the transport. No connection is made until the first send.
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let from: Mailbox = config.from_address.parse().map_err(|e| {
            AppError::configuration(format!(
                "Invalid email.from_address '{}': {e}",
                config.from_address
            ))
        })?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Invalid SMTP relay", e)
            })?
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.send_timeout_seconds)));

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> AppResult<()> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::email(format!("Invalid recipient '{}': {e}", email.to)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                email.html_body.clone(),
            ))
            .map_err(|e| AppError::with_source(ErrorKind::Email, "Failed to build email", e))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Email, "SMTP send failed", e))?;

        debug!(to = %email.to, "Email sent");
        Ok(())
    }
}
