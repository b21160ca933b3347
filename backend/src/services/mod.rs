//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories, password hashing and token issuance.

pub mod user;

pub use user::UserService;
