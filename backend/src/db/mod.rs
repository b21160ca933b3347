//! Database connection and pool management
//!
//! Connection options are assembled from the individual DSN components in
//! [`DatabaseConfig`] rather than from a URL, so the password never has to
//! be URL-encoded.

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, Postgres};
use sqlx::Transaction;
use std::time::Duration;
use tracing::{info, warn};

/// Build connection options from the configured DSN components
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
        .application_name("study-records")
}

/// Pool options derived from the configured limits
///
/// sqlx has no cap on idle connections; `max_idle_conns` becomes the number
/// of connections kept open, never more than `max_open_conns`.
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(config.max_idle_conns.min(config.max_open_conns))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .max_lifetime(Duration::from_secs(config.conn_max_lifetime_secs))
        .test_before_acquire(true)
}

/// Create a PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = pool_options(config)
        .connect_with(connect_options(config))
        .await?;

    info!(
        host = %config.host,
        database = %config.name,
        max = config.max_open_conns,
        "Database pool created"
    );

    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Begin a transaction running at REPEATABLE READ
///
/// The isolation level has to be set before the first query of the
/// transaction, so callers must not run anything on it beforehand.
pub async fn begin_repeatable_read(pool: &PgPool) -> sqlx::Result<Transaction<'static, Postgres>> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// Check database health
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            e.into()
        })
}
