//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, database migrations and the Axum server lifecycle.

use crate::application::services::{PasswordHasher, UserService};
use crate::config::Config;
use crate::domain::repositories::UserStore;
use crate::infrastructure::persistence::{InMemoryUserStore, PgUserStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations, or the in-memory store
/// - Password hasher with the configured work factor
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The password policy is rejected
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = build_store(&config).await?;
    let state = build_state(&config, store)?;

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Connects to PostgreSQL with the configured pool settings.
///
/// # Errors
///
/// Returns an error if no database is configured or the connection fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL or DB_* variables must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    Ok(pool)
}

/// Selects the store: PostgreSQL when configured, otherwise in-memory.
async fn build_store(config: &Config) -> Result<Arc<dyn UserStore>> {
    if !config.is_database_enabled() {
        tracing::warn!("No database configured. Using in-memory store; data is lost on restart.");
        return Ok(Arc::new(InMemoryUserStore::new()));
    }

    let pool = connect_pool(config).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;
    tracing::info!("Migrations applied");

    Ok(Arc::new(PgUserStore::new(Arc::new(pool))))
}

/// Wires the service graph over a store.
///
/// # Errors
///
/// Returns an error if the password policy is rejected by Argon2.
pub fn build_state(config: &Config, store: Arc<dyn UserStore>) -> Result<AppState> {
    let hasher = PasswordHasher::new(config.password_policy)?;
    let user_service = UserService::new(store, hasher, config.store_timeout());

    Ok(AppState::new(Arc::new(user_service)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
