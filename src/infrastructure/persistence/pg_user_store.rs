//! PostgreSQL implementation of the user store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{NewUser, PasswordChange, Role, User, UserChanges, UserProfile};
use crate::domain::repositories::UserStore;
use crate::error::AppError;

const USER_COLUMNS: &str =
    "id, email, role, password_hash, verification_token, profile, created_at, updated_at";

/// PostgreSQL repository for user documents.
///
/// Identity, email, role and password live in typed columns so the database
/// can enforce uniqueness and the role enumeration; the rest of the profile is
/// one JSONB document.
pub struct PgUserStore {
    pool: Arc<PgPool>,
}

impl PgUserStore {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    role: String,
    password_hash: Option<String>,
    verification_token: Option<String>,
    profile: Json<UserProfile>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(|_| {
            tracing::warn!(user_id = %row.id, role = %row.role, "Stored role is not recognised");
            AppError::external("Stored user record is corrupt")
        })?;

        Ok(User {
            id: row.id,
            email: row.email,
            role,
            password_hash: row.password_hash,
            verification_token: row.verification_token,
            profile: row.profile.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (id, email, role, password_hash, verification_token, profile)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(&user.verification_token)
        .bind(Json(&user.profile))
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool.as_ref())
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(self.pool.as_ref())
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY seq"))
                .fetch_all(self.pool.as_ref())
                .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AppError> {
        let (replace_password, new_hash) = match &changes.password {
            PasswordChange::Keep => (false, None),
            PasswordChange::Replace(hash) => (true, Some(hash.as_str())),
        };

        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users SET
                email         = COALESCE($2, email),
                role          = COALESCE($3, role),
                profile       = profile || $4::JSONB,
                password_hash = CASE WHEN $5 THEN $6::TEXT ELSE password_hash END,
                updated_at    = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.email.as_deref())
        .bind(changes.role.map(|role| role.as_str()))
        .bind(Json(changes.profile.as_map()))
        .bind(replace_password)
        .bind(new_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.ok_or_else(|| AppError::not_found(id.to_string()))?
            .try_into()
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
