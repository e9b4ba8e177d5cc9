//! Application layer services implementing business logic.
//!
//! Services orchestrate domain rules and repository calls and provide a clean
//! API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::user_service::UserService`] - Registration, lookup, listing and updates
//! - [`services::password::PasswordHasher`] - Salted one-way password hashing

pub mod services;
