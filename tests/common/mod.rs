#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use user_registry::application::services::{PasswordHasher, PasswordPolicy, UserService};
use user_registry::domain::repositories::UserStore;
use user_registry::infrastructure::persistence::InMemoryUserStore;
use user_registry::routes::build_router;
use user_registry::state::AppState;

/// Cheap Argon2 parameters so tests do not spend seconds hashing.
pub fn fast_policy() -> PasswordPolicy {
    PasswordPolicy {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::new(fast_policy()).unwrap()
}

pub fn create_test_state_with(store: Arc<dyn UserStore>) -> AppState {
    let service = UserService::new(store, fast_hasher(), Duration::from_secs(5));
    AppState::new(Arc::new(service))
}

/// State over a fresh in-memory store. The store handle is returned so tests
/// can inspect what was persisted.
pub fn create_test_state() -> (AppState, Arc<InMemoryUserStore>) {
    let store = Arc::new(InMemoryUserStore::new());
    let state = create_test_state_with(store.clone());
    (state, store)
}

pub fn make_server() -> (TestServer, Arc<InMemoryUserStore>) {
    let (state, store) = create_test_state();
    let server = TestServer::new(build_router(state)).unwrap();
    (server, store)
}

pub async fn create_user(server: &TestServer, email: &str, role: &str) -> Value {
    let response = server
        .post("/api/v1/users")
        .json(&json!({ "email": email, "role": role, "password": "secret123" }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["user"].clone()
}
