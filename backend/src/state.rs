//! Application state management
//!
//! The state is built once at startup and handed to the router; handlers,
//! the auth gate and services receive it through Axum's state extraction.
//! Nothing in the service lives in process-wide globals.

use crate::auth::JwtService;
use crate::config::AppConfig;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
///
/// All fields are cheap to clone: `PgPool` and `JwtService` are internally
/// reference counted and the configuration sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token issuer/verifier with keys derived from the configured secret
    pub jwt: JwtService,
}

impl AppState {
    /// Create a new application state
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.ttl_secs());

        Self {
            db,
            config: Arc::new(config),
            jwt,
        }
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}
