//! User store implementations.
//!
//! # Stores
//!
//! - [`PgUserStore`] - PostgreSQL, profile kept as a JSONB document
//! - [`InMemoryUserStore`] - Process-local, used without a database and in tests

pub mod memory_user_store;
pub mod pg_user_store;

pub use memory_user_store::InMemoryUserStore;
pub use pg_user_store::PgUserStore;
