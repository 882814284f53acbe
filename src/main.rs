//! Warden Server: account verification and session tokens.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use warden_api::AppState;
use warden_auth::{CodeGenerator, PasswordHasher, PasswordValidator, TokenService};
use warden_cache::provider::CacheManager;
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_database::{DatabasePool, MemoryUserRepository, UserRepository};
use warden_messaging::{DeletionConsumer, EventPublisher};
use warden_service::{AccountService, SessionService, UserRemovalService, VerificationTemplate};

#[tokio::main]
async fn main() {
    let env = std::env::var("WARDEN_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.jwt_secret.is_empty() {
        return Err(AppError::configuration("auth.jwt_secret must be set"));
    }

    // ── Step 1: User store ───────────────────────────────────────
    let (users, db_pool): (Arc<dyn UserRepository>, Option<DatabasePool>) =
        match config.database.backend.as_str() {
            "postgres" => {
                tracing::info!("Connecting to database...");
                let pool = DatabasePool::open(&config.database).await?;
                let repo: Arc<dyn UserRepository> = Arc::new(pool.user_repository());
                (repo, Some(pool))
            }
            "memory" => {
                tracing::warn!("Using in-memory user store; accounts are lost on restart");
                let repo: Arc<dyn UserRepository> = Arc::new(MemoryUserRepository::new());
                (repo, None)
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown database backend: '{other}'. Supported: postgres, memory"
                )));
            }
        };

    // ── Step 2: Cache (token denylist) ───────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache...");
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    // ── Step 3: Broker, publisher, mailer ────────────────────────
    let broker = warden_messaging::broker::from_config(&config.broker).await?;
    let publisher = Arc::new(EventPublisher::new(Arc::clone(&broker), &config.broker));
    let mailer = warden_service::mail::from_config(&config.email)?;

    // ── Step 4: Auth primitives ──────────────────────────────────
    let hasher = Arc::new(PasswordHasher::new());
    let validator = Arc::new(PasswordValidator::new(&config.auth));
    let tokens = Arc::new(TokenService::new(&config.auth, Arc::clone(&cache)));
    let codes = CodeGenerator::new(config.auth.verification_code_ttl_seconds);

    // ── Step 5: Services ─────────────────────────────────────────
    let accounts = Arc::new(AccountService::new(
        Arc::clone(&users),
        Arc::clone(&hasher),
        validator,
        codes,
        mailer,
        VerificationTemplate::new(config.email.product_name.clone()),
        publisher,
        &config.auth,
        Duration::from_secs(config.email.send_timeout_seconds),
    ));
    let sessions = Arc::new(SessionService::new(Arc::clone(&users), hasher, tokens));
    let removal = Arc::new(UserRemovalService::new(Arc::clone(&users)));

    // ── Step 6: Shutdown channel & deletion consumer ─────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let consumer = DeletionConsumer::new(Arc::clone(&broker), removal, &config.broker);
    let consumer_handle = tokio::spawn(async move {
        consumer.run(shutdown_rx).await;
    });

    // ── Step 7: Build and start HTTP server ──────────────────────
    let app_state = AppState {
        config: Arc::new(config.clone()),
        users,
        cache,
        accounts,
        sessions,
    };
    let app = warden_api::build_app(app_state, &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Warden listening on {}", addr);

    // ── Step 8: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 9: Wait for background tasks ────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, consumer_handle).await.is_err() {
        tracing::warn!("Deletion consumer did not stop within the grace period");
    }
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("Warden shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
