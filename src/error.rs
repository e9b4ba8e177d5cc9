//! Application error taxonomy and its translation to HTTP responses.
//!
//! [`AppError`] is the only error type that crosses layer boundaries. The store,
//! the validation rules and the services all return it; [`AppError::normalize`]
//! is the single place where an error kind becomes a status code and message.
//!
//! # Response body
//!
//! Every error is rendered as:
//!
//! ```json
//! { "msg": "No resource found with id: 42" }
//! ```

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::utils::db_error::constraint_field;

/// Message used for server-side failures that carry no usable description.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong, try again later";

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    msg: String,
}

/// Structured error kinds produced by the core.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// One or more fields failed validation. User-fixable.
    #[error("validation failed: {}", join_reasons(.0))]
    Validation(Vec<Violation>),

    /// A unique constraint rejected the write. User-fixable.
    #[error("duplicate value for {field}")]
    DuplicateKey { field: String },

    /// The identifier is malformed or unknown.
    #[error("no resource found with id: {id}")]
    NotFound { id: String },

    /// Storage or infrastructure failure.
    #[error("external failure: {}", .0.as_deref().unwrap_or("unspecified"))]
    External(Option<String>),

    /// Catch-all for failures that fit no other kind.
    #[error("unknown error")]
    Unknown,
}

impl AppError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation(vec![Violation::new(field, reason)])
    }

    pub fn duplicate(field: impl Into<String>) -> Self {
        Self::DuplicateKey {
            field: field.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn external(message: impl Into<String>) -> Self {
        Self::External(Some(message.into()))
    }

    /// Maps the error kind to the status code and message sent to clients.
    ///
    /// | Kind | Status | Message |
    /// |---|---|---|
    /// | `Validation` | 400 | reasons joined with `,` |
    /// | `DuplicateKey` | 400 | "The value entered for {field} is already present, ..." |
    /// | `NotFound` | 404 | "No resource found with id: {id}" |
    /// | `External` / `Unknown` | 500 | underlying message or the generic one |
    pub fn normalize(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(violations) => {
                (StatusCode::BAD_REQUEST, join_reasons(violations))
            }
            AppError::DuplicateKey { field } => (
                StatusCode::BAD_REQUEST,
                format!(
                    "The value entered for {field} is already present, please choose another value."
                ),
            ),
            AppError::NotFound { id } => (
                StatusCode::NOT_FOUND,
                format!("No resource found with id: {id}"),
            ),
            AppError::External(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                message
                    .as_deref()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or(GENERIC_FAILURE_MESSAGE)
                    .to_string(),
            ),
            AppError::Unknown => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE_MESSAGE.to_string(),
            ),
        }
    }
}

fn join_reasons(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.reason.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = self.normalize();

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(ErrorBody { msg })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return AppError::duplicate(constraint_field(db.constraint()));
            }
            if db.is_check_violation() {
                let field = constraint_field(db.constraint());
                let reason = format!("Please provide a valid {field}");
                return AppError::validation(field, reason);
            }
        }

        match e {
            sqlx::Error::PoolTimedOut => AppError::external("Storage pool timed out"),
            other => {
                tracing::warn!(error = %other, "Database error");
                AppError::external("Database error")
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("body", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation("id", rejection.body_text())
    }
}

/// Response for requests that match no route.
pub async fn route_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            msg: "Route does not exist".to_string(),
        }),
    )
        .into_response()
}
