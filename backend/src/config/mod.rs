//! Configuration management for the Study Records backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: APP__)
//!
//! The token secret and the database password have no usable default; startup
//! fails until both are supplied.

use anyhow::Result;
use axum::http::{HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub logger: LoggerConfig,
    pub app: AppSettings,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

/// Database configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    pub conn_max_lifetime_secs: u64,
    pub acquire_timeout_secs: u64,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .field("name", &self.name)
            .field("max_open_conns", &self.max_open_conns)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("conn_max_lifetime_secs", &self.conn_max_lifetime_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

/// Longest accepted token lifetime, ten years
pub const MAX_TOKEN_HOURS: i64 = 87_600;

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

impl JwtConfig {
    /// Token lifetime in seconds
    ///
    /// Saturates instead of overflowing; `AppConfig::validate` rejects
    /// lifetimes above [`MAX_TOKEN_HOURS`].
    pub fn ttl_secs(&self) -> i64 {
        self.expiration_hours.saturating_mul(3600)
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

/// CORS allow-lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub level: String,
    pub format: String,
}

impl LoggerConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Listing defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub pagination_default_limit: i64,
    pub pagination_max_limit: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                env: "development".to_string(),
            },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                user: "postgres".to_string(),
                password: String::new(),
                name: "university_db".to_string(),
                max_open_conns: 25,
                max_idle_conns: 25,
                conn_max_lifetime_secs: 300,
                acquire_timeout_secs: 30,
            },
            jwt: JwtConfig {
                secret: String::new(),
                expiration_hours: 24,
            },
            cors: CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
                allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
                allowed_headers: vec!["Authorization".to_string(), "Content-Type".to_string()],
            },
            logger: LoggerConfig {
                level: "debug".to_string(),
                format: "json".to_string(),
            },
            app: AppSettings {
                pagination_default_limit: 10,
                pagination_max_limit: 100,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with APP__ prefix
    ///
    /// The result is validated before it is returned.
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (APP__ prefix)
            // e.g., APP__SERVER__PORT=9000 sets server.port,
            // APP__CORS__ALLOWED_ORIGINS=http://a,http://b sets a list
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .with_list_parse_key("cors.allowed_methods")
                    .with_list_parse_key("cors.allowed_headers"),
            )
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings the service cannot run without
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.jwt.secret.is_empty() {
            errors.push("jwt.secret is required".to_string());
        } else if Self::is_production() && self.jwt.secret.len() < 32 {
            errors.push("jwt.secret must be at least 32 characters in production".to_string());
        }

        if self.jwt.expiration_hours <= 0 {
            errors.push("jwt.expiration_hours must be positive".to_string());
        } else if self.jwt.expiration_hours > MAX_TOKEN_HOURS {
            errors.push(format!(
                "jwt.expiration_hours must not exceed {}",
                MAX_TOKEN_HOURS
            ));
        }

        if self.database.password.is_empty() {
            errors.push("database.password is required".to_string());
        }

        if self.database.max_open_conns == 0 {
            errors.push("database.max_open_conns must be positive".to_string());
        }

        if self.app.pagination_default_limit <= 0
            || self.app.pagination_default_limit > self.app.pagination_max_limit
        {
            errors.push(
                "app.pagination_default_limit must be positive and not exceed pagination_max_limit"
                    .to_string(),
            );
        }

        for origin in &self.cors.allowed_origins {
            if HeaderValue::from_str(origin).is_err() {
                errors.push(format!("cors.allowed_origins contains an invalid origin: {}", origin));
            }
        }
        for method in &self.cors.allowed_methods {
            if Method::from_bytes(method.trim().as_bytes()).is_err() {
                errors.push(format!("cors.allowed_methods contains an invalid method: {}", method));
            }
        }
        for header in &self.cors.allowed_headers {
            if HeaderName::from_bytes(header.trim().as_bytes()).is_err() {
                errors.push(format!("cors.allowed_headers contains an invalid header: {}", header));
            }
        }

        if !errors.is_empty() {
            anyhow::bail!("Invalid configuration: {}", errors.join("; "));
        }

        Ok(())
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
