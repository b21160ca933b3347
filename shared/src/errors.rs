//! Error types shared between the service and its clients

use thiserror::Error;

/// Authentication error types
///
/// All variants are reported to clients as 401 Unauthorized; the
/// distinction only matters for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing token")]
    MissingToken,
}
