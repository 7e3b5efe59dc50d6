mod api;
mod app;
mod auth;
mod config;
mod storage;
mod web;

use crate::api::AppState;
use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::storage::{JsonlStore, MemoryStore, RecordStore};
use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("🍪 Starting Cookie Stands server");
    info!("📋 Configuration loaded");
    info!("   - Server: {}:{}", config.server.host, config.server.port);
    info!("   - Login URL: {}", config.auth.login_url);

    // Initialize users
    let users = config.build_users()?;
    if users.is_empty() {
        warn!("⚠️  No users configured, every protected route will reject requests");
    }
    info!("👤 {} user(s) registered", users.len());

    // Initialize record store
    let store: Box<dyn RecordStore> = match config.storage.jsonl_path() {
        Some(path) => {
            info!("💾 Opening cookie stand log at {:?}", path);
            Box::new(
                JsonlStore::open(path)
                    .with_context(|| format!("Failed to open store at {}", path.display()))?,
            )
        }
        None => {
            info!("💾 Using in-memory cookie stand store");
            Box::new(MemoryStore::new())
        }
    };
    info!("✅ Record store ready ({} cookie stands)", store.count());

    // Create application state
    let state = AppState::new(
        store,
        users,
        SessionStore::new(config.auth.session_ttl()),
        config.auth.login_url.clone(),
    );

    let app = app::build_router(state, config.server.enable_cors);

    // Start server
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET    /health                       - Health check");
    info!("   GET    /                             - Cookie stand list");
    info!("   GET    /{{id}}/                        - Cookie stand detail");
    info!("   GET    /accounts/login/              - Login form");
    info!("   POST   /accounts/logout/             - Log out");
    info!("   POST   /api/v1/auth/token            - Issue API token");
    info!("   GET    /api/v1/cookie_stands/        - List cookie stands");
    info!("   POST   /api/v1/cookie_stands/        - Create cookie stand");
    info!("   PUT    /api/v1/cookie_stands/{{id}}/   - Update cookie stand");
    info!("   DELETE /api/v1/cookie_stands/{{id}}/   - Delete cookie stand");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

    info!("🛑 Shutdown signal received");
}
