//! Shared test helpers for storage module tests.

use crate::storage::{init_memory_pool, run_migrations, SqliteStore};

/// Creates an in-memory store with migrations applied.
pub async fn create_test_store() -> SqliteStore {
    let pool = init_memory_pool()
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    SqliteStore::new(pool)
}
