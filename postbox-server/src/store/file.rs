//! JSON file record store
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a temporary file that is
//! then renamed over the target, so readers never observe a half-written list.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use postbox_core::parse_items;
use serde_json::Value;

use super::{RecordStore, StoreError};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::Query(format!("invalid store key '{}'", key)));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn get(&self, key: &str) -> Result<Vec<Value>, StoreError> {
        let path = self.path_for(key)?;
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        parse_items(&json).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn set(&self, key: &str, items: &[Value]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(items)?;

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(key, count = items.len(), path = %path.display(), "Wrote record list");
        Ok(())
    }

    async fn check_health(&self) -> Result<(), StoreError> {
        tokio::fs::metadata(&self.dir).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
