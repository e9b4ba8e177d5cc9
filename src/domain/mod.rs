//! Domain layer containing the user model and its rules.
//!
//! This module is independent of infrastructure and presentation concerns.
//!
//! # Architecture
//!
//! - [`entities`] - The user entity and its write-side inputs
//! - [`validation`] - Pure field rules applied before persistence
//! - [`repositories`] - The persistence contract implemented by the infrastructure layer
//!
//! # Write Flow
//!
//! 1. HTTP handler decodes a [`entities::UserDraft`] or [`entities::UserPatch`]
//! 2. [`crate::application::services::UserService`] runs [`validation`] and hashes passwords
//! 3. The validated record is written through [`repositories::UserStore`]
//! 4. Failures surface as [`crate::error::AppError`] and are normalized at the HTTP boundary

pub mod entities;
pub mod repositories;
pub mod validation;
