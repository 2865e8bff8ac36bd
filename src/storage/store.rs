//! Document store interface and its SQLite implementation.
//!
//! The pipeline only needs four operations: clear a collection, insert many
//! documents, and read them back whole or by key. Documents are stored as
//! JSON text next to their natural key.

use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::error_handling::DatabaseError;

/// Destination collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Domains,
    Organizations,
    Reports,
}

/// A value stored in one collection under a unique key.
pub trait Document: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    /// Unique key within the collection.
    fn key(&self) -> &str;

    /// Key of the organization this document belongs to, if any.
    fn ref_key(&self) -> Option<&str> {
        None
    }
}

/// Minimal document-store operations used by publishing and exports.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Removes every document in a collection. Returns the number removed.
    async fn clear(&self, collection: Collection) -> Result<u64, DatabaseError>;

    /// Inserts documents into their collection, all or nothing.
    async fn insert_many<D: Document>(&self, documents: &[D]) -> Result<usize, DatabaseError>;

    /// Every document of a collection, in insertion order.
    async fn find_all<D: Document>(&self) -> Result<Vec<D>, DatabaseError>;

    /// The document stored under `key`, if any.
    async fn find_one<D: Document>(&self, key: &str) -> Result<Option<D>, DatabaseError>;
}

/// SQLite-backed document store, one table per collection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteStore {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

impl DocumentStore for SqliteStore {
    async fn clear(&self, collection: Collection) -> Result<u64, DatabaseError> {
        let result = sqlx::query(&format!("DELETE FROM {}", collection))
            .execute(self.pool.as_ref())
            .await?;
        debug!("Cleared {} {}", result.rows_affected(), collection);
        Ok(result.rows_affected())
    }

    async fn insert_many<D: Document>(&self, documents: &[D]) -> Result<usize, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (key, ref_key, document) VALUES (?, ?, ?)",
            D::COLLECTION
        );
        let mut tx = self.pool.begin().await?;
        for document in documents {
            let json = serde_json::to_string(document)?;
            sqlx::query(&sql)
                .bind(document.key())
                .bind(document.ref_key())
                .bind(json)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(documents.len())
    }

    async fn find_all<D: Document>(&self) -> Result<Vec<D>, DatabaseError> {
        let rows: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT document FROM {} ORDER BY rowid",
            D::COLLECTION
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter()
            .map(|json| serde_json::from_str(json).map_err(DatabaseError::from))
            .collect()
    }

    async fn find_one<D: Document>(&self, key: &str) -> Result<Option<D>, DatabaseError> {
        let row: Option<String> = sqlx::query_scalar(&format!(
            "SELECT document FROM {} WHERE key = ?",
            D::COLLECTION
        ))
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(|json| serde_json::from_str(&json).map_err(DatabaseError::from))
            .transpose()
    }
}
