mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use axum_test::TestServer;
use std::sync::Arc;
use user_registry::api::handlers::health_handler;
use user_registry::domain::entities::{NewUser, User, UserChanges};
use user_registry::domain::repositories::UserStore;
use user_registry::error::AppError;
use uuid::Uuid;

fn make_server(store: Arc<dyn UserStore>) -> TestServer {
    let state = common::create_test_state_with(store);
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let (state, _store) = common::create_test_state();
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);

    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["store"]["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

/// Store whose backend is unreachable.
struct DownStore;

#[async_trait]
impl UserStore for DownStore {
    async fn insert(&self, _user: NewUser) -> Result<User, AppError> {
        Err(AppError::external("Database error"))
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, AppError> {
        Err(AppError::external("Database error"))
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, AppError> {
        Err(AppError::external("Database error"))
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Err(AppError::external("Database error"))
    }

    async fn update(&self, _id: Uuid, _changes: UserChanges) -> Result<User, AppError> {
        Err(AppError::external("Database error"))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::external("Database error"))
    }
}

#[tokio::test]
async fn test_health_endpoint_degraded() {
    let server = make_server(Arc::new(DownStore));

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["store"]["status"], "error");
}

#[tokio::test]
async fn test_storage_failure_is_500_with_message() {
    let state = common::create_test_state_with(Arc::new(DownStore));
    let server = TestServer::new(user_registry::routes::build_router(state)).unwrap();

    let response = server.get("/api/v1/users").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&serde_json::json!({ "msg": "Database error" }));
}
