//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use warden_cache::provider::CacheManager;
use warden_core::config::AppConfig;
use warden_database::UserRepository;
use warden_service::{AccountService, SessionService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// User store, probed by the health endpoint
    pub users: Arc<dyn UserRepository>,
    /// Cache manager holding the token denylist
    pub cache: Arc<CacheManager>,
    /// Register, verify and resend
    pub accounts: Arc<AccountService>,
    /// Login, logout and token validation
    pub sessions: Arc<SessionService>,
}
