// storage/mod.rs
// Document store and database operations

pub mod migrations;
pub mod pool;
pub mod queries;
pub mod store;
#[cfg(test)]
pub mod test_helpers;

// Re-export commonly used items
pub use migrations::run_migrations;
pub use pool::{init_db_pool_with_path, init_memory_pool};
pub use queries::{
    eligible_hosts, eligible_organizations, eligible_parents, hosts_for_domain, latest_report,
};
pub use store::{Collection, Document, DocumentStore, SqliteStore};

use std::path::Path;

use crate::error_handling::DatabaseError;

/// Opens the SQLite store at `db_path`, creating and migrating it as needed.
pub async fn open_store(db_path: &Path) -> Result<SqliteStore, DatabaseError> {
    let pool = init_db_pool_with_path(db_path).await?;
    run_migrations(&pool).await?;
    Ok(SqliteStore::new(pool))
}
