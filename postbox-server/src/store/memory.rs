//! In-memory record store
//!
//! Used in development and tests. Contents are lost on restart.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{RecordStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    lists: DashMap<String, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with one list (for tests).
    pub fn with_items(key: &str, items: Vec<Value>) -> Self {
        let store = Self::new();
        store.lists.insert(key.to_string(), items);
        store
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .lists
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn set(&self, key: &str, items: &[Value]) -> Result<(), StoreError> {
        self.lists.insert(key.to_string(), items.to_vec());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
