//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, worker and janitor spawning, and the Axum
//! server lifecycle including graceful shutdown.

use crate::config::Config;
use crate::domain::click_worker::{ClickRecorder, run_click_worker};
use crate::infrastructure::memory::{RateLimiter, SessionStore};
use crate::infrastructure::persistence::{
    PgClickRepository, PgUrlRepository, PgUserRepository,
};
use crate::routes::app_router;
use crate::state::{AppState, HttpSettings, Repositories, Runtime};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// Opens the connection pool with the configured limits.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Background click worker
/// - Rate limiter and session store, each with its janitor
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, the janitors
/// are stopped and the click worker drains the events it already holds.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let pool = Arc::new(pool);
    let repos = Repositories {
        urls: Arc::new(PgUrlRepository::new(pool.clone())),
        clicks: Arc::new(PgClickRepository::new(pool.clone())),
        users: Arc::new(PgUserRepository::new(pool.clone())),
    };

    let (recorder, click_rx) = ClickRecorder::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        repos.clicks.clone(),
        config.click_worker_concurrency,
    ));

    let rate_limiter = RateLimiter::start(config.rate_limit_requests, config.rate_limit_window());
    let sessions = SessionStore::start();

    let state = AppState::new(
        repos,
        HttpSettings::from_config(&config),
        Runtime {
            recorder,
            rate_limiter: rate_limiter.clone(),
            sessions: sessions.clone(),
            oauth: None,
        },
    );

    let app = app_router(state, &config.frontend_url);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("HTTP server stopped");

    rate_limiter.shutdown().await;
    sessions.shutdown().await;

    // The router, and with it the last click sender, is gone once `serve`
    // returns, so the worker sees a closed channel and drains.
    if let Err(e) = worker.await {
        error!(error = %e, "Click worker panicked");
    }

    pool.close().await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, stopping server");
}
