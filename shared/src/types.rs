//! API request and response types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// API error response
///
/// Every failure is reported as a single human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Generic confirmation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Authentication Types
// ============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub fullname: String,
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

/// Issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

// ============================================================================
// User Types
// ============================================================================

/// Create user request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub fullname: String,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(range(min = 0.0))]
    pub commission: f64,
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

/// Update user request
///
/// A missing or empty `password` keeps the stored hash. A missing `email`
/// keeps the stored email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub fullname: String,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(range(min = 0.0))]
    pub commission: f64,
    #[serde(default)]
    #[validate(length(max = 1024))]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    /// The replacement password, if the caller supplied a non-empty one
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// User as exposed by the API (never carries a password or hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub fullname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub category: String,
    pub commission: f64,
}

/// Optional pagination for user listings
///
/// With neither field present the full listing is returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl ListUsersQuery {
    /// Resolve the query against the configured limits
    ///
    /// Returns `None` when no pagination was requested.
    pub fn normalize(&self, default_limit: i64, max_limit: i64) -> Option<Page> {
        if self.limit.is_none() && self.offset.is_none() {
            return None;
        }

        let max_limit = max_limit.max(1);
        Some(Page {
            limit: self.limit.unwrap_or(default_limit).clamp(1, max_limit),
            offset: self.offset.unwrap_or(0).max(0),
        })
    }
}
