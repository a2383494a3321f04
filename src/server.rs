//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache and mail setup, worker spawning, and
//! the Axum server lifecycle.

use crate::config::Config;
use crate::domain::email_job::EmailQueue;
use crate::domain::email_worker::{EmailWorker, run_email_worker};
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::mail::{EmailComposer, HttpMailer, LogMailer, Mailer};
use crate::infrastructure::persistence::PgRentalRepository;
use crate::routes::app_router;
use crate::state::{AppState, JwtSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Mail transport and the background email worker
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The mail relay client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let cache = connect_cache(&config).await;
    let mailer = build_mailer(&config)?;

    let pool = Arc::new(pool);
    let (email_queue, email_rx) = EmailQueue::channel(config.email_queue_capacity);

    let composer = EmailComposer::new(
        config.mail_from.clone(),
        config.mail_brand_name.clone(),
        config.pickup_location.clone(),
    );
    let worker = Arc::new(EmailWorker::new(
        Arc::new(PgRentalRepository::new(pool.clone())),
        mailer,
        composer,
    ));
    tokio::spawn(run_email_worker(
        email_rx,
        worker,
        config.email_worker_concurrency,
    ));
    tracing::info!("Email worker started");

    let jwt = JwtSettings {
        secret: config.jwt_secret.clone(),
        access_ttl_seconds: config.access_token_ttl_seconds,
        refresh_ttl_seconds: config.refresh_token_ttl_seconds,
    };
    let state = AppState::new(pool, cache, config.cache_ttl_seconds, email_queue, &jwt);

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = config.redis_url.as_deref() else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

fn build_mailer(config: &Config) -> Result<Arc<dyn Mailer>> {
    match config.mail_api_url.as_deref() {
        Some(url) => {
            let mailer = HttpMailer::new(url, config.mail_api_key.clone())
                .context("Failed to build mail relay client")?;
            tracing::info!("Mail delivery via HTTP relay");
            Ok(Arc::new(mailer))
        }
        None => {
            tracing::info!("Mail delivery disabled, emails are logged");
            Ok(Arc::new(LogMailer::new()))
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
