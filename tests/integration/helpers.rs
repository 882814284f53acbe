//! Shared test helpers for integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use warden_api::AppState;
use warden_auth::{CodeGenerator, PasswordHasher, PasswordValidator, TokenService};
use warden_cache::provider::CacheManager;
use warden_core::config::AppConfig;
use warden_core::result::AppResult;
use warden_core::traits::{Mailer, OutboundEmail};
use warden_database::{MemoryUserRepository, UserRepository};
use warden_messaging::{EventPublisher, MemoryBroker, Topology};
use warden_service::{AccountService, SessionService, UserRemovalService, VerificationTemplate};

/// Mailer that keeps every email it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    /// The six-digit code in the last email sent to `to`.
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
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// User store shared with the router
    pub users: Arc<MemoryUserRepository>,
    /// Broker the router publishes to
    pub broker: Arc<MemoryBroker>,
    /// Captures verification emails
    pub mailer: Arc<RecordingMailer>,
    /// Removal service for driving the consumer side
    pub removal: Arc<UserRemovalService>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-secret".to_string();
        config.auth.admin_code = Some("letmein".to_string());
        config.broker.consumer_poll_timeout_seconds = 0;

        let users = Arc::new(MemoryUserRepository::new());
        let repo: Arc<dyn UserRepository> = users.clone();
        let cache = Arc::new(
            CacheManager::new(&config.cache)
                .await
                .expect("Failed to init cache"),
        );
        let broker = Arc::new(MemoryBroker::new(Topology::from_config(&config.broker)));
        let mailer = Arc::new(RecordingMailer::default());

        let hasher = Arc::new(PasswordHasher::new());
        let tokens = Arc::new(TokenService::new(&config.auth, Arc::clone(&cache)));
        let publisher = Arc::new(EventPublisher::new(broker.clone(), &config.broker));

        let accounts = Arc::new(AccountService::new(
            Arc::clone(&repo),
            Arc::clone(&hasher),
            Arc::new(PasswordValidator::new(&config.auth)),
            CodeGenerator::new(config.auth.verification_code_ttl_seconds),
            mailer.clone(),
            VerificationTemplate::new("Test Site"),
            publisher,
            &config.auth,
            Duration::from_secs(1),
        ));
        let sessions = Arc::new(SessionService::new(Arc::clone(&repo), hasher, tokens));
        let removal = Arc::new(UserRemovalService::new(Arc::clone(&repo)));

        let state = AppState {
            config: Arc::new(config.clone()),
            users: repo,
            cache,
            accounts,
            sessions,
        };
        let router = warden_api::build_app(state, &config.server);

        Self {
            router,
            users,
            broker,
            mailer,
            removal,
            config,
        }
    }

    /// Register through the API and return the emailed code.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/auth/register",
                Some(serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": password,
                })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );
        self.mailer
            .last_code_for(email)
            .expect("No verification email captured")
    }

    /// Register and verify, returning nothing but a loginable account.
    pub async fn create_verified_user(&self, name: &str, email: &str, password: &str) {
        let code = self.register(name, email, password).await;
        let response = self
            .request(
                "POST",
                "/auth/verify",
                Some(serde_json::json!({ "email": email, "code": code })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "Verify failed: {:?}", response.body);
    }

    /// Login and return the session token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self.request("POST", "/auth/login", Some(body), None).await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Parsed JSON body, `Null` when the body was not JSON
    pub body: Value,
}
