//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

pub mod order;
pub mod product;
pub mod stock_entry;

// Re-exports
pub use order::OrderRepository;
pub use product::{ProductRepository, StockStateWrite};
pub use stock_entry::StockEntryRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: "table:id" everywhere across the stack
// =============================================================================
//
// All IDs are surrealdb::RecordId:
//   - parse: let id: RecordId = "product:abc".parse()?;
//   - build: RecordId::from_table_key("product", "abc")
//   - table name: id.table(), bare key: id.key().to_string()

/// Parse an id that may arrive as "table:key" or a bare key
pub fn record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    if id.contains(':') {
        let rid: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid id: {}", id)))?;
        if rid.table() != table {
            return Err(RepoError::Validation(format!(
                "Expected a {} id, got: {}",
                table, id
            )));
        }
        Ok(rid)
    } else {
        Ok(RecordId::from_table_key(table, id))
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
