//! Business logic services for the application layer.

pub mod password;
pub mod user_service;

pub use password::{PasswordHasher, PasswordPolicy};
pub use user_service::UserService;
