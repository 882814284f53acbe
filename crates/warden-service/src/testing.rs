//! Shared fixtures for service tests: every collaborator in memory.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use warden_auth::{CodeGenerator, PasswordHasher, PasswordValidator, TokenService};
use warden_cache::memory::MemoryCacheProvider;
use warden_cache::provider::CacheManager;
use warden_core::config::cache::MemoryCacheConfig;
use warden_core::config::{AuthConfig, BrokerConfig};
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{Mailer, MessageBroker, OutboundEmail};
use warden_database::{MemoryUserRepository, UserRepository};
use warden_messaging::{EventPublisher, MemoryBroker, Topology};

use crate::account::AccountService;
use crate::mail::VerificationTemplate;
use crate::session::SessionService;

/// Mailer that keeps every email and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
    pub fail: std::sync::atomic::AtomicBool,
}

impl RecordingMailer {
    /// The last code mailed to `to`, read from the plain-text body.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|e| e.to == to)
            .and_then(|e| {
                e.text_body
                    .split_whitespace()
                    .find(|w| w.len() == 6 && w.chars().all(|c| c.is_ascii_digit()))
                    .map(str::to_string)
            })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> AppResult<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AppError::email("SMTP relay unreachable"));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct Fixture {
    pub users: Arc<MemoryUserRepository>,
    pub broker: Arc<MemoryBroker>,
    pub mailer: Arc<RecordingMailer>,
    pub tokens: Arc<TokenService>,
    pub accounts: AccountService,
    pub sessions: SessionService,
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".to_string(),
        admin_code: Some("letmein".to_string()),
        ..AuthConfig::default()
    }
}

pub fn fixture() -> Fixture {
    fixture_with(auth_config(), None)
}

/// Build a fixture, optionally publishing through `broker` instead of the
/// in-memory one.
pub fn fixture_with(auth: AuthConfig, broker_override: Option<Arc<dyn MessageBroker>>) -> Fixture {
    let broker_config = BrokerConfig::default();
    let users = Arc::new(MemoryUserRepository::new());
    let broker = Arc::new(MemoryBroker::new(Topology::from_config(&broker_config)));
    let mailer = Arc::new(RecordingMailer::default());
    let cache = Arc::new(CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
        &MemoryCacheConfig { initial_capacity: 16 },
    ))));
    let tokens = Arc::new(TokenService::new(&auth, cache));
    let hasher = Arc::new(PasswordHasher::new());

    let publish_via: Arc<dyn MessageBroker> = broker_override.unwrap_or_else(|| broker.clone());
    let publisher = Arc::new(EventPublisher::new(publish_via, &broker_config));
    let repo: Arc<dyn UserRepository> = users.clone();

    let accounts = AccountService::new(
        Arc::clone(&repo),
        Arc::clone(&hasher),
        Arc::new(PasswordValidator::new(&auth)),
        CodeGenerator::new(auth.verification_code_ttl_seconds),
        mailer.clone(),
        VerificationTemplate::new("Test Site"),
        publisher,
        &auth,
        std::time::Duration::from_secs(1),
    );
    let sessions = SessionService::new(repo, hasher, Arc::clone(&tokens));

    Fixture {
        users,
        broker,
        mailer,
        tokens,
        accounts,
        sessions,
    }
}
