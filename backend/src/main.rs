//! Study Records Backend
//!
//! HTTP API for the academic records application: token login and user
//! management over PostgreSQL.
//!
//! ## Architecture
//!
//! - Routes: HTTP request handling, the auth gate and extractors
//! - Services: login and user operations, including transactional writes
//! - Repositories: SQL for users and the analyses that reference them
//! - Database: PostgreSQL with SQLx

use anyhow::Result;
use study_records_backend::{
    config::{AppConfig, LoggerConfig},
    db, routes,
    state::AppState,
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load and validate configuration; nothing is served on failure
    let config = AppConfig::load()?;

    init_tracing(&config.logger);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %config.server.env,
        "Starting Study Records Backend"
    );

    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;

    // Production schemas are migrated by a separate job
    if !AppConfig::is_production() {
        db::run_migrations(&db_pool).await?;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::new(db_pool, config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logger: &LoggerConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "study_records_backend={},tower_http=info,sqlx=warn",
            logger.level
        )
        .into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if logger.is_json() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
