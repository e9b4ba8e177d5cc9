//! Persistence contract for user documents.

use crate::domain::entities::{NewUser, User, UserChanges};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage interface for users.
///
/// The store owns identity assignment, timestamps and the unique email
/// constraint. It performs no field validation of its own beyond what its
/// schema enforces.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserStore`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUserStore`] - Process-local implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_user.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateKey`] if the email is already taken.
    /// Returns [`AppError::External`] on storage errors.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    /// Finds a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::External`] on storage errors.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Finds a user by exact email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::External`] on storage errors.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Lists every user in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::External`] on storage errors.
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Applies changes to a user in a single write.
    ///
    /// Absent email and role are kept, profile changes are merged onto the
    /// stored profile, and the password hash is only written for
    /// [`crate::domain::entities::PasswordChange::Replace`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no user has this id.
    /// Returns [`AppError::DuplicateKey`] if the new email is already taken.
    /// Returns [`AppError::External`] on storage errors.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AppError>;

    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::External`] if the store cannot be reached.
    async fn ping(&self) -> Result<(), AppError>;
}
