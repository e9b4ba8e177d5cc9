//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::UserService;
use crate::domain::repositories::UserStore;

/// State cloned into every request.
///
/// The store is type-erased so the same router serves PostgreSQL in
/// production and the in-memory store in tests and local runs.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<dyn UserStore>>,
}

impl AppState {
    pub fn new(user_service: Arc<UserService<dyn UserStore>>) -> Self {
        Self { user_service }
    }
}
