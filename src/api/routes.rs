//! API route configuration.

use crate::api::handlers::{
    create_user_handler, get_user_handler, list_users_handler, update_user_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Versioned API routes, mounted under `/api/v1`.
///
/// # Endpoints
///
/// - `GET   /users`       - List users
/// - `POST  /users`       - Register a user
/// - `GET   /users/{id}`  - Fetch one user
/// - `PATCH /users/{id}`  - Partially update a user
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users_handler).post(create_user_handler))
        .route("/users/{id}", get(get_user_handler).patch(update_user_handler))
}
