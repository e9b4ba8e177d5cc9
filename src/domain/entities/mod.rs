//! Core domain entities representing the user data model.
//!
//! # Entity Types
//!
//! - [`User`] - A stored user account
//! - [`UserProfile`] - Descriptive and relational attributes kept as one document
//!
//! # Write-side inputs
//!
//! - [`UserDraft`] / [`UserPatch`] - Raw client input, checked by
//!   [`crate::domain::validation`]
//! - [`NewUser`] / [`UserChanges`] - Validated, hashed records handed to the store

pub mod user;

pub use user::{
    AppliedFor, NewUser, PasswordChange, Permission, ProfileChanges, ProfileInput, Role, Status,
    User, UserChanges, UserDraft, UserPatch, UserProfile, YesNo,
};
