//! Password hashing using argon2
//!
//! New hashes are Argon2id PHC strings. Accounts imported from the previous
//! system still carry bcrypt hashes (`$2a$`, `$2b$`, `$2y$`); those verify
//! through bcrypt until the user sets a new password.
//!
//! # Performance Considerations
//!
//! Both algorithms are intentionally CPU-intensive. Async callers use the
//! `*_async` variants, which run on the blocking thread pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::warn;

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Well-formed Argon2id hash with default cost that no password matches
    ///
    /// Verified in place of a stored hash when the login name is unknown.
    pub const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

    /// Hash a password using argon2 (blocking operation)
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// Returns an error when the stored hash cannot be parsed.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        if is_bcrypt_hash(hash) {
            return bcrypt::verify(password, hash)
                .map_err(|e| anyhow::anyhow!("Invalid bcrypt hash: {}", e));
        }

        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Verify login credentials (blocking operation)
    ///
    /// Any failure, including a malformed stored hash, counts as a mismatch.
    pub fn verify_credentials(password: &str, hash: &str) -> bool {
        match Self::verify(password, hash) {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, "stored password hash could not be verified");
                false
            }
        }
    }

    /// Verify login credentials asynchronously (non-blocking)
    pub async fn verify_credentials_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify_credentials(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }
}

fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}
