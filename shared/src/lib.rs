//! Study Records Shared Library
//!
//! Wire types, request validation and the authentication error taxonomy
//! shared by the backend and its clients.

pub mod errors;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
