//! Verification email rendering and delivery.

pub mod log;
pub mod smtp;
pub mod template;

use std::sync::Arc;

use tracing::info;

use warden_core::config::EmailConfig;
use warden_core::result::AppResult;
use warden_core::traits::Mailer;

pub use self::log::LogMailer;
pub use smtp::SmtpMailer;
pub use template::VerificationTemplate;

/// Create the mailer selected by configuration.
pub fn from_config(config: &EmailConfig) -> AppResult<Arc<dyn Mailer>> {
    if config.enabled {
        info!(host = %config.smtp_host, port = config.smtp_port, "Using SMTP mailer");
        Ok(Arc::new(SmtpMailer::new(config)?))
    } else {
        info!("Email disabled; verification emails will only be logged");
        Ok(Arc::new(LogMailer))
    }
}
