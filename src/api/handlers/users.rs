//! Handlers for user endpoints.
//!
//! Handlers only translate between HTTP and [`UserService`](crate::application::services::UserService);
//! every failure is an [`AppError`] and is rendered by its `IntoResponse` impl.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use crate::api::dto::user::{UserEnvelope, UserListResponse};
use crate::domain::entities::{UserDraft, UserPatch};
use crate::error::AppError;
use crate::state::AppState;

/// Registers a new user.
///
/// # Endpoint
///
/// `POST /api/v1/users`
///
/// # Errors
///
/// Returns 400 if the body is malformed or a field fails validation.
/// Returns 400 if the email is already registered.
/// Returns 500 on storage failures.
pub async fn create_user_handler(
    State(state): State<AppState>,
    payload: Result<Json<UserDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let Json(draft) = payload?;

    let user = state.user_service.create(draft).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Lists all users in registration order.
///
/// # Endpoint
///
/// `GET /api/v1/users`
pub async fn list_users_handler(
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, AppError> {
    let users = state.user_service.list().await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// Fetches one user.
///
/// # Endpoint
///
/// `GET /api/v1/users/{id}`
///
/// # Errors
///
/// Returns 400 if the path segment cannot be decoded.
/// Returns 404 if the id is malformed or unknown.
pub async fn get_user_handler(
    path: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<UserEnvelope>, AppError> {
    let Path(id) = path?;
    let user = state.user_service.find_by_id(&id).await?;

    Ok(Json(user.into()))
}

/// Partially updates a user.
///
/// # Endpoint
///
/// `PATCH /api/v1/users/{id}`
///
/// Absent fields keep their stored value. The password is re-hashed only when
/// the body contains `password`.
///
/// # Errors
///
/// Returns 400 if the body is malformed or a field fails validation.
/// Returns 400 if the new email is already registered.
/// Returns 400 if the path segment cannot be decoded.
/// Returns 404 if the id is malformed or unknown.
pub async fn update_user_handler(
    path: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<UserEnvelope>, AppError> {
    let Path(id) = path?;
    let Json(patch) = payload?;

    let user = state.user_service.update(&id, patch).await?;

    Ok(Json(user.into()))
}
