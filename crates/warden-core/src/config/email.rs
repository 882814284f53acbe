//! Outbound email configuration.

use serde::{Deserialize, Serialize};

/// SMTP delivery settings for verification emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// When false, emails are only logged.
    #[serde(default)]
    pub enabled: bool,
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP port (587 for STARTTLS).
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub username: String,
    /// SMTP password.
    #[serde(default)]
    pub password: String,
    /// `From` mailbox, e.g. `"Warden <no-reply@example.com>"`.
    #[serde(default = "default_from")]
    pub from_address: String,
    /// Product name shown in the email template.
    #[serde(default = "default_product")]
    pub product_name: String,
    /// Upper bound on one send, in seconds.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_seconds: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from_address: default_from(),
            product_name: default_product(),
            send_timeout_seconds: default_send_timeout(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from() -> String {
    "Warden <no-reply@localhost>".to_string()
}

fn default_product() -> String {
    "Music Reviews Site".to_string()
}

fn default_send_timeout() -> u64 {
    10
}
