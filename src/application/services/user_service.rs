//! User registration and maintenance service.

use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::application::services::password::PasswordHasher;
use crate::domain::entities::{NewUser, PasswordChange, User, UserChanges, UserDraft, UserPatch};
use crate::domain::repositories::UserStore;
use crate::domain::validation;
use crate::error::AppError;

/// Length of generated email verification tokens, in bytes before hex encoding.
const VERIFICATION_TOKEN_BYTES: usize = 20;

/// Service for creating, reading and updating users.
///
/// Every write goes through the validation rules first; the password is hashed
/// only when the incoming record carries a new plaintext. Each store call is
/// bounded by `store_timeout` and reported as [`AppError::External`] when it
/// elapses.
pub struct UserService<S: UserStore + ?Sized> {
    store: Arc<S>,
    hasher: PasswordHasher,
    store_timeout: Duration,
}

impl<S: UserStore + ?Sized> UserService<S> {
    /// Creates a new user service.
    ///
    /// # Arguments
    ///
    /// - `store` - persistence backend
    /// - `hasher` - password hasher configured with the work factor
    /// - `store_timeout` - upper bound for a single store call
    pub fn new(store: Arc<S>, hasher: PasswordHasher, store_timeout: Duration) -> Self {
        Self {
            store,
            hasher,
            store_timeout,
        }
    }

    /// Registers a new user.
    ///
    /// # Flow
    ///
    /// 1. Run validation rules over the draft
    /// 2. Hash the password if one was supplied
    /// 3. Attach a verification token to unverified accounts
    /// 4. Insert through the store
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] with every violated rule.
    /// Returns [`AppError::DuplicateKey`] if the email is already registered.
    /// Returns [`AppError::External`] on hashing or storage failures.
    pub async fn create(&self, draft: UserDraft) -> Result<User, AppError> {
        let valid = validation::validate_draft(&draft).map_err(AppError::Validation)?;

        let password_hash = match valid.password {
            Some(plaintext) => Some(self.hash_password(plaintext).await?),
            None => None,
        };

        let verification_token = (!valid.profile.verified).then(generate_verification_token);

        let new_user = NewUser {
            email: valid.email,
            role: valid.role,
            password_hash,
            verification_token,
            profile: valid.profile,
        };

        let user = self
            .within_deadline("insert", self.store.insert(new_user))
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");

        Ok(user)
    }

    /// Retrieves a user by its id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id is malformed or unknown.
    /// Returns [`AppError::External`] on storage errors.
    pub async fn find_by_id(&self, raw_id: &str) -> Result<User, AppError> {
        let id = parse_id(raw_id)?;

        self.within_deadline("find_by_id", self.store.find_by_id(id))
            .await?
            .ok_or_else(|| AppError::not_found(raw_id))
    }

    /// Retrieves a user by email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no user has this email.
    /// Returns [`AppError::External`] on storage errors.
    pub async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        let email = email.trim();

        self.within_deadline("find_by_email", self.store.find_by_email(email))
            .await?
            .ok_or_else(|| AppError::not_found(email))
    }

    /// Lists every user in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::External`] on storage errors.
    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.within_deadline("list", self.store.list()).await
    }

    /// Applies a partial update.
    ///
    /// Only the fields present in the patch are validated. The store merges
    /// the accepted changes onto the stored record in one write, so patches
    /// touching different fields never overwrite each other. The stored
    /// password hash is replaced only when the patch carries a password.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id is malformed or unknown.
    /// Returns [`AppError::Validation`] with every violated rule.
    /// Returns [`AppError::DuplicateKey`] if the new email is already registered.
    /// Returns [`AppError::External`] on hashing or storage failures.
    pub async fn update(&self, raw_id: &str, patch: UserPatch) -> Result<User, AppError> {
        let id = parse_id(raw_id)?;

        let valid = validation::validate_patch(&patch).map_err(AppError::Validation)?;

        let password = match valid.password {
            Some(plaintext) => PasswordChange::Replace(self.hash_password(plaintext).await?),
            None => PasswordChange::Keep,
        };
        let password_changed = matches!(password, PasswordChange::Replace(_));

        let changes = UserChanges {
            email: valid.email,
            role: valid.role,
            password,
            profile: valid.profile,
        };

        let user = self
            .within_deadline("update", self.store.update(id, changes))
            .await
            .map_err(|e| match e {
                AppError::NotFound { .. } => AppError::not_found(raw_id),
                other => other,
            })?;

        tracing::info!(user_id = %user.id, password_changed, "User updated");

        Ok(user)
    }

    /// Compares a plaintext with the user's stored password.
    ///
    /// Returns `false` when the user has no password.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id is malformed or unknown.
    /// Returns [`AppError::External`] on storage errors.
    /// Returns [`AppError::Unknown`] if the verification task dies.
    pub async fn check_password(&self, raw_id: &str, plaintext: &str) -> Result<bool, AppError> {
        let user = self.find_by_id(raw_id).await?;

        let Some(hash) = user.password_hash else {
            return Ok(false);
        };

        let hasher = self.hasher.clone();
        let plaintext = plaintext.to_string();

        run_blocking("verify_password", move || hasher.verify(&plaintext, &hash)).await
    }

    /// Checks that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::External`] if the store cannot be reached in time.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.within_deadline("ping", self.store.ping()).await
    }

    /// Hashes off the async runtime; Argon2 is deliberately slow.
    async fn hash_password(&self, plaintext: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();

        run_blocking("hash_password", move || hasher.hash(&plaintext)).await?
    }

    async fn within_deadline<T, F>(&self, operation: &'static str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Storage operation timed out"
                );
                Err(AppError::external("Storage operation timed out"))
            }
        }
    }
}

/// Runs CPU-bound work on the blocking pool.
///
/// A panicked or cancelled task becomes [`AppError::Unknown`].
async fn run_blocking<T, F>(task: &'static str, work: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::warn!(error = %e, task, "Blocking task failed");
        AppError::Unknown
    })
}

fn parse_id(raw_id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw_id).map_err(|_| AppError::not_found(raw_id))
}

fn generate_verification_token() -> String {
    let mut bytes = [0u8; VERIFICATION_TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}
