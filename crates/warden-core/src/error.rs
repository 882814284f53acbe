//! Unified application error types for Warden.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Business-rule kinds tell the caller
//! their input was wrong; infrastructure kinds tell them to try again later.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input validation failed.
    Validation,
    /// The name or email is already registered.
    Conflict,
    /// No user matches the given email or id.
    NotFound,
    /// The verification code is at or past its expiry.
    VerificationExpired,
    /// The submitted verification code does not match the stored one.
    CodeMismatch,
    /// The account is already enabled.
    AlreadyVerified,
    /// Login failed. Never says whether the user or the password was wrong.
    InvalidCredentials,
    /// The token is malformed or its signature does not verify.
    InvalidToken,
    /// The token is past its expiry.
    ExpiredToken,
    /// The token was revoked before its natural expiry.
    RevokedToken,
    /// A lifecycle event could not be handed off to the broker.
    Publish,
    /// A database error occurred.
    Database,
    /// A cache error occurred.
    Cache,
    /// A message broker error occurred.
    Broker,
    /// An outbound email error occurred.
    Email,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
}

impl ErrorKind {
    /// Whether this kind describes an infrastructure failure rather than
    /// a business-rule rejection.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Publish
                | Self::Database
                | Self::Cache
                | Self::Broker
                | Self::Email
                | Self::Configuration
                | Self::Serialization
                | Self::Internal
                | Self::ServiceUnavailable
        )
    }

    /// Whether this kind is one of the token validation failures.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::ExpiredToken | Self::RevokedToken
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::VerificationExpired => write!(f, "VERIFICATION_EXPIRED"),
            Self::CodeMismatch => write!(f, "CODE_MISMATCH"),
            Self::AlreadyVerified => write!(f, "ALREADY_VERIFIED"),
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::InvalidToken => write!(f, "INVALID_TOKEN"),
            Self::ExpiredToken => write!(f, "EXPIRED_TOKEN"),
            Self::RevokedToken => write!(f, "REVOKED_TOKEN"),
            Self::Publish => write!(f, "PUBLISH"),
            Self::Database => write!(f, "DATABASE"),
            Self::Cache => write!(f, "CACHE"),
            Self::Broker => write!(f, "BROKER"),
            Self::Email => write!(f, "EMAIL"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// The unified application error used throughout Warden.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a verification-expired error.
    pub fn verification_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::VerificationExpired, message)
    }

    /// Create a code-mismatch error.
    pub fn code_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CodeMismatch, message)
    }

    /// Create an already-verified error.
    pub fn already_verified(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyVerified, message)
    }

    /// Create an invalid-credentials error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    /// Create an invalid-token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    /// Create an expired-token error.
    pub fn expired_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExpiredToken, message)
    }

    /// Create a revoked-token error.
    pub fn revoked_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RevokedToken, message)
    }

    /// Create a publish error.
    pub fn publish(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Publish, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a broker error.
    pub fn broker(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Broker, message)
    }

    /// Create an email error.
    pub fn email(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Email, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Shorthand for checking the error kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
