//! Account lifecycle: register, verify and resend.
//!
//! An account starts unverified with a pending code and becomes enabled
//! exactly once, when the current code is submitted before it expires.
//! The `user.registered` event is handed to the broker inside the verify
//! call; if that hand-off fails the account is put back to unverified and
//! the caller sees a `Publish` error.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use warden_auth::{CodeGenerator, PasswordHasher, PasswordValidator};
use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::events::UserRegistered;
use warden_core::result::AppResult;
use warden_core::traits::Mailer;
use warden_database::UserRepository;
use warden_entity::user::model::normalize_email;
use warden_entity::user::{NewUser, User, UserRole};
use warden_messaging::EventPublisher;

use crate::mail::VerificationTemplate;

/// Maximum display name length, in characters.
const MAX_NAME_CHARS: usize = 64;

/// Signup input.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Desired unique display name.
    pub name: String,
    /// Email address; normalised before use.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Optional admin secret.
    pub admin_code: Option<String>,
}

/// Owns the unverified → verified transition.
#[derive(Debug, Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    codes: CodeGenerator,
    mailer: Arc<dyn Mailer>,
    template: VerificationTemplate,
    publisher: Arc<EventPublisher>,
    admin_code: Option<String>,
    mail_timeout: Duration,
}

impl AccountService {
    /// Creates a new account service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        codes: CodeGenerator,
        mailer: Arc<dyn Mailer>,
        template: VerificationTemplate,
        publisher: Arc<EventPublisher>,
        config: &AuthConfig,
        mail_timeout: Duration,
    ) -> Self {
        Self {
            users,
            hasher,
            validator,
            codes,
            mailer,
            template,
            publisher,
            admin_code: config.admin_code.clone().filter(|c| !c.is_empty()),
            mail_timeout,
        }
    }

    /// Register a new, unverified account and mail its first code.
    ///
    /// The returned record carries the code; callers must not expose it.
    pub async fn register(&self, registration: Registration) -> AppResult<User> {
        let name = registration.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Name must not be blank"));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(AppError::validation(format!(
                "Name must be at most {MAX_NAME_CHARS} characters"
            )));
        }
        let email = normalize_email(&registration.email);
        if !email.contains('@') {
            return Err(AppError::validation("Invalid email address"));
        }
        self.validator.validate(&registration.password)?;

        let role = self.role_for(registration.admin_code.as_deref());
        let password_hash = self.hasher.hash_password(&registration.password)?;
        let verification = self.codes.generate(Utc::now());

        let user = self
            .users
            .create(NewUser {
                name,
                email,
                password_hash,
                role,
                verification,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered, awaiting verification");
        self.send_code(&user).await;
        Ok(user)
    }

    /// Verify the account registered under `email` with `code`.
    ///
    /// Checks, in order: the account exists, it is not already enabled,
    /// its code has not expired, the code matches.
    ///
    /// If publishing `user.registered` fails, the account is put back to
    /// unverified with its code and the error is returned. A concurrent
    /// caller that lost the activation race during that window is told
    /// `AlreadyVerified` even though the account ends up unverified; it can
    /// retry with the same code once the rollback lands.
    pub async fn verify(&self, email: &str, code: &str) -> AppResult<User> {
        let now = Utc::now();
        let user = self.find_by_email(email).await?;
        check_code(&user, code, now)?;

        if !self.users.activate(user.id, code, now).await? {
            return Err(self.explain_lost_race(&user, code).await);
        }

        let event = UserRegistered::new(user.id, user.name.clone());
        if let Err(e) = self.publisher.publish_user_registered(&event).await {
            self.undo_activation(&user).await;
            return Err(e);
        }

        info!(user_id = %user.id, "User verified");
        let mut verified = user;
        verified.enabled = true;
        verified.verification_code = None;
        verified.verification_code_expires_at = None;
        Ok(verified)
    }

    /// Replace the pending code of an unverified account and mail it.
    pub async fn resend(&self, email: &str) -> AppResult<()> {
        let mut user = self.find_by_email(email).await?;
        if user.enabled {
            return Err(AppError::already_verified("User already verified"));
        }

        let fresh = self.codes.generate(Utc::now());
        if !self.users.reissue_code(user.id, &fresh).await? {
            return match self.users.find_by_id(user.id).await? {
                None => Err(AppError::not_found("User not found")),
                Some(_) => Err(AppError::already_verified("User already verified")),
            };
        }

        info!(user_id = %user.id, "Verification code reissued");
        user.verification_code = Some(fresh.code);
        user.verification_code_expires_at = Some(fresh.expires_at);
        self.send_code(&user).await;
        Ok(())
    }

    fn role_for(&self, submitted: Option<&str>) -> UserRole {
        match (self.admin_code.as_deref(), submitted) {
            (Some(expected), Some(given)) if expected == given => UserRole::Admin,
            _ => UserRole::User,
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        self.users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Work out why a conditional activation did not apply.
    async fn explain_lost_race(&self, user: &User, code: &str) -> AppError {
        match self.users.find_by_id(user.id).await {
            Ok(None) => AppError::not_found("User not found"),
            Ok(Some(current)) => match check_code(&current, code, Utc::now()) {
                Err(e) => e,
                Ok(()) => AppError::code_mismatch("Wrong validation code"),
            },
            Err(e) => e,
        }
    }

    /// Put a just-activated account back to its unverified state.
    async fn undo_activation(&self, original: &User) {
        match self.users.save(original).await {
            Ok(()) => warn!(user_id = %original.id, "Verification rolled back after publish failure"),
            Err(e) => error!(
                user_id = %original.id,
                error = %e,
                "Failed to roll back verification after publish failure"
            ),
        }
    }

    /// Mail the pending code. Failures are logged; the code stays stored.
    async fn send_code(&self, user: &User) {
        let Some(code) = user.verification_code.as_deref() else {
            return;
        };
        let email = self.template.render(&user.email, &user.name, code);
        match tokio::time::timeout(self.mail_timeout, self.mailer.send(&email)).await {
            Ok(Ok(())) => info!(user_id = %user.id, "Verification email sent"),
            Ok(Err(e)) => warn!(user_id = %user.id, error = %e, "Failed to send verification email"),
            Err(_) => warn!(user_id = %user.id, "Timed out sending verification email"),
        }
    }
}

fn check_code(user: &User, code: &str, now: DateTime<Utc>) -> AppResult<()> {
    if user.enabled {
        return Err(AppError::already_verified("User already verified"));
    }
    let Some(pending) = user.pending_code() else {
        return Err(AppError::verification_expired("Validation code expired"));
    };
    if pending.is_expired_at(now) {
        return Err(AppError::verification_expired("Validation code expired"));
    }
    if pending.code != code {
        return Err(AppError::code_mismatch("Wrong validation code"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::Duration as ChronoDuration;
    use warden_core::error::ErrorKind;
    use warden_core::traits::{Delivery, MessageBroker};
    use warden_messaging::codec;

    use crate::testing::{auth_config, fixture, fixture_with};

    fn alice() -> Registration {
        Registration {
            name: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "pw1".to_string(),
            admin_code: None,
        }
    }

    #[derive(Debug)]
    struct DownBroker;

    #[async_trait]
    impl MessageBroker for DownBroker {
        async fn publish(&self, _: &str, _: &str, _: Bytes) -> AppResult<()> {
            Err(AppError::broker("connection refused"))
        }
        async fn receive(&self, _: &str, _: Duration) -> AppResult<Option<Delivery>> {
            Ok(None)
        }
        async fn ack(&self, _: &Delivery) -> AppResult<()> {
            Ok(())
        }
        async fn nack(&self, _: &Delivery) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_register_creates_unverified_account_with_future_expiry() {
        let f = fixture();
        let before = Utc::now();
        let user = f.accounts.register(alice()).await.unwrap();

        assert!(!user.enabled);
        assert_eq!(user.role, UserRole::User);
        let pending = user.pending_code().expect("pending code");
        assert!(pending.expires_at > before);
        assert_eq!(f.mailer.last_code_for("a@x.com"), Some(pending.code));
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_normalises_email() {
        let f = fixture();
        let user = f
            .accounts
            .register(Registration {
                email: "  A@X.COM ".to_string(),
                ..alice()
            })
            .await
            .unwrap();
        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_register_duplicate_name_or_email_conflicts() {
        let f = fixture();
        f.accounts.register(alice()).await.unwrap();

        let same_name = Registration {
            email: "other@x.com".to_string(),
            ..alice()
        };
        let same_email = Registration {
            name: "bob".to_string(),
            email: "A@x.com".to_string(),
            ..alice()
        };
        for reg in [same_name, same_email] {
            let err = f.accounts.register(reg).await.unwrap_err();
            assert!(err.is(ErrorKind::Conflict));
        }
    }

    #[tokio::test]
    async fn test_admin_code_grants_admin() {
        let f = fixture();
        let admin = f
            .accounts
            .register(Registration {
                admin_code: Some("letmein".to_string()),
                ..alice()
            })
            .await
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);

        let wrong = f
            .accounts
            .register(Registration {
                name: "bob".to_string(),
                email: "b@x.com".to_string(),
                admin_code: Some("guess".to_string()),
                ..alice()
            })
            .await
            .unwrap();
        assert_eq!(wrong.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_empty_admin_code_config_grants_nothing() {
        let f = fixture_with(
            AuthConfig {
                admin_code: Some(String::new()),
                ..auth_config()
            },
            None,
        );
        let user = f
            .accounts
            .register(Registration {
                admin_code: Some(String::new()),
                ..alice()
            })
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_register_survives_mail_failure() {
        let f = fixture();
        f.mailer.fail.store(true, Ordering::SeqCst);

        let user = f.accounts.register(alice()).await.unwrap();
        let stored = f.users.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.pending_code().is_some());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let f = fixture();
        for reg in [
            Registration { name: "  ".to_string(), ..alice() },
            Registration { email: "no-at-sign".to_string(), ..alice() },
            Registration { password: "   ".to_string(), ..alice() },
        ] {
            let err = f.accounts.register(reg).await.unwrap_err();
            assert!(err.is(ErrorKind::Validation));
        }
        assert!(f.users.is_empty().await);
    }

    #[tokio::test]
    async fn test_verify_unknown_email_is_not_found() {
        let f = fixture();
        let err = f.accounts.verify("ghost@x.com", "123456").await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_verify_wrong_code_is_mismatch_and_keeps_state() {
        let f = fixture();
        let user = f.accounts.register(alice()).await.unwrap();
        let wrong = if user.verification_code.as_deref() == Some("000000") { "111111" } else { "000000" };

        let err = f.accounts.verify("a@x.com", wrong).await.unwrap_err();
        assert!(err.is(ErrorKind::CodeMismatch));
        let stored = f.users.find_by_id(user.id).await.unwrap().unwrap();
        assert!(!stored.enabled);
        assert_eq!(f.broker.pending("user.queue").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_verify_success_enables_and_publishes_once() {
        let f = fixture();
        let user = f.accounts.register(alice()).await.unwrap();
        let code = user.verification_code.clone().unwrap();

        let verified = f.accounts.verify("a@x.com", &code).await.unwrap();
        assert!(verified.enabled);
        assert!(verified.pending_code().is_none());

        let stored = f.users.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.enabled);
        assert!(stored.is_consistent());

        let messages = f.broker.drain("user.queue").unwrap();
        assert_eq!(messages.len(), 1);
        let event = codec::decode_user_registered(&messages[0]).unwrap();
        assert_eq!(event.user_id, user.id);
        assert_eq!(event.name, "alice");

        let err = f.accounts.verify("a@x.com", &code).await.unwrap_err();
        assert!(err.is(ErrorKind::AlreadyVerified));
        assert_eq!(f.broker.pending("user.queue").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected_even_if_correct() {
        let f = fixture_with(
            AuthConfig {
                verification_code_ttl_seconds: 0,
                ..auth_config()
            },
            None,
        );
        let user = f.accounts.register(alice()).await.unwrap();
        let code = user.verification_code.clone().unwrap();

        let err = f.accounts.verify("a@x.com", &code).await.unwrap_err();
        assert!(err.is(ErrorKind::VerificationExpired));
    }

    #[tokio::test]
    async fn test_expiry_checked_before_equality() {
        let f = fixture();
        let mut user = f.accounts.register(alice()).await.unwrap();
        user.verification_code_expires_at = Some(Utc::now() - ChronoDuration::seconds(1));
        f.users.save(&user).await.unwrap();

        let err = f.accounts.verify("a@x.com", "not-the-code").await.unwrap_err();
        assert!(err.is(ErrorKind::VerificationExpired));
    }

    #[tokio::test]
    async fn test_resend_invalidates_previous_code() {
        let f = fixture();
        let user = f.accounts.register(alice()).await.unwrap();
        let old = user.verification_code.clone().unwrap();

        let mut new = old.clone();
        for _ in 0..20 {
            f.accounts.resend("a@x.com").await.unwrap();
            new = f.mailer.last_code_for("a@x.com").unwrap();
            if new != old {
                break;
            }
        }
        assert_ne!(new, old);

        let err = f.accounts.verify("a@x.com", &old).await.unwrap_err();
        assert!(err.is(ErrorKind::CodeMismatch));
        f.accounts.verify("a@x.com", &new).await.unwrap();
    }

    #[tokio::test]
    async fn test_resend_rules() {
        let f = fixture();
        let err = f.accounts.resend("ghost@x.com").await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));

        let user = f.accounts.register(alice()).await.unwrap();
        f.accounts
            .verify("a@x.com", user.verification_code.as_deref().unwrap())
            .await
            .unwrap();
        let err = f.accounts.resend("a@x.com").await.unwrap_err();
        assert!(err.is(ErrorKind::AlreadyVerified));
    }

    #[tokio::test]
    async fn test_publish_failure_fails_verify_and_rolls_back() {
        let f = fixture_with(auth_config(), Some(Arc::new(DownBroker)));
        let user = f.accounts.register(alice()).await.unwrap();
        let code = user.verification_code.clone().unwrap();

        let err = f.accounts.verify("a@x.com", &code).await.unwrap_err();
        assert!(err.is(ErrorKind::Publish));

        let stored = f.users.find_by_id(user.id).await.unwrap().unwrap();
        assert!(!stored.enabled);
        assert_eq!(stored.verification_code, Some(code));
    }

    #[tokio::test]
    async fn test_concurrent_verifies_publish_once() {
        let f = fixture();
        let user = f.accounts.register(alice()).await.unwrap();
        let code = user.verification_code.clone().unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let accounts = f.accounts.clone();
            let code = code.clone();
            handles.push(tokio::spawn(async move { accounts.verify("a@x.com", &code).await }));
        }
        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert!(e.is(ErrorKind::AlreadyVerified), "unexpected {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(f.broker.drain("user.queue").unwrap().len(), 1);
    }
}
