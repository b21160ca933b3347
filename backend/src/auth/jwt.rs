//! JWT token generation and validation
//!
//! Tokens are HS256-signed and stateless: there is no revocation list, a
//! token stays valid until its `exp` passes.

use anyhow::Result;
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_records_shared::AuthError;
use tracing::debug;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user
    pub user_id: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Pre-computed JWT keys for efficient token operations
/// These are derived once at startup and shared through AppState
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// JWT service for token operations
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// `ttl_secs` must be positive; configuration validation enforces it.
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            keys: JwtKeys::new(secret),
            validation,
            ttl_secs,
        }
    }

    /// Issue a token for a user, expiring one TTL from now
    #[inline]
    pub fn issue(&self, user_id: i64) -> Result<String> {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.ttl_secs)
            .ok_or_else(|| anyhow::anyhow!("Token lifetime of {}s is out of range", self.ttl_secs))?;

        let claims = Claims { user_id, iat, exp };

        let token = encode(&Header::new(Algorithm::HS256), &claims, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))?;
        debug!(user_id, exp = claims.exp, "token issued");
        Ok(token)
    }

    /// Validate a token and return its claims
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Validate a token and return the authenticated user id
    #[inline]
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        self.decode_claims(token).map(|claims| claims.user_id)
    }

    /// Token lifetime in seconds
    #[inline]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }
}
