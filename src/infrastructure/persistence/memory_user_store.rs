//! In-memory implementation of the user store.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{NewUser, PasswordChange, User, UserChanges};
use crate::domain::repositories::UserStore;
use crate::error::AppError;

/// Process-local user store.
///
/// Records are kept in insertion order. The unique email check, the profile
/// merge and the write happen under one write lock, so concurrent registrations
/// of the same email cannot both succeed and concurrent patches cannot drop
/// each other's profile keys.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::duplicate("email"));
        }

        let now = Utc::now();
        let stored = User {
            id: Uuid::new_v4(),
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
            verification_token: user.verification_token,
            profile: user.profile,
            created_at: now,
            updated_at: now,
        };
        users.push(stored.clone());

        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.read().await.clone())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AppError> {
        let mut users = self.users.write().await;

        let taken = changes
            .email
            .as_ref()
            .is_some_and(|email| users.iter().any(|u| u.id != id && &u.email == email));
        if taken {
            return Err(AppError::duplicate("email"));
        }

        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found(id.to_string()))?;

        let profile = changes.profile.apply_to(&user.profile).map_err(|e| {
            tracing::warn!(error = %e, user_id = %id, "Failed to merge profile changes");
            AppError::external("Failed to merge profile changes")
        })?;

        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.profile = profile;
        if let PasswordChange::Replace(hash) = changes.password {
            user.password_hash = Some(hash);
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
