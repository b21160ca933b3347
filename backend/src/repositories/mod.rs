//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod analysis;
pub mod user;

pub use analysis::AnalysisRepository;
pub use user::{CredentialRecord, UserInput, UserRecord, UserRepository};
