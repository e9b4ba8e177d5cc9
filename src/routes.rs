//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`          - Welcome banner
//! - `GET  /health`    - Store health check
//! - `/api/v1/*`       - User API
//! - anything else     - 404 `{"msg":"Route does not exist"}`, including an
//!   unsupported method on a known path
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Compression** - gzip for clients that accept it
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, root_handler};
use crate::api::middleware::tracing;
use crate::error::route_not_found;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::compression::CompressionLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with all routes and per-route middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/v1", api::routes::v1_routes())
        .method_not_allowed_fallback(route_not_found)
        .fallback(route_not_found)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(tracing::layer())
}

/// Constructs the application service: the router behind trailing-slash
/// normalization, so `/api/v1/users/` and `/api/v1/users` hit the same handler.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state))
}
