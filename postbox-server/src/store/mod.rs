//! Record store module
//!
//! The collection lives as one JSON list under a single key. Backends:
//! - **PostgreSQL** (`kv_store` table): selected when `DATABASE_URL` is set.
//! - **JSON file**: one file per key under `DATA_DIR`.
//! - **In-memory** (`DashMap`): development fallback, lost on restart.
//!
//! Every backend has replace-all semantics. There is no locking between a
//! read and the following write; the last writer wins. Items are stored as
//! the JSON values they were submitted as, never re-encoded.

mod file;
mod memory;
mod postgres;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Query(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Key/value storage for record lists.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// The items stored under `key`, or an empty list when the key is missing.
    async fn get(&self, key: &str) -> Result<Vec<Value>, StoreError>;

    /// Replace the whole list stored under `key`.
    async fn set(&self, key: &str, items: &[Value]) -> Result<(), StoreError>;

    /// Check that the backend is reachable.
    async fn check_health(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Pick a backend from the configuration.
///
/// PostgreSQL wins over the file store, which wins over memory.
pub async fn from_config(config: &Config) -> Result<Box<dyn RecordStore>, StoreError> {
    if let Some(url) = &config.database_url {
        let store = PostgresStore::new(url).await?;
        return Ok(Box::new(store));
    }

    if let Some(dir) = &config.data_dir {
        let store = FileStore::new(dir).await?;
        tracing::info!(dir = %dir.display(), "Using JSON file record store");
        return Ok(Box::new(store));
    }

    tracing::warn!("Using in-memory record store - records will be lost on restart!");
    Ok(Box::new(MemoryStore::new()))
}
