//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use postbox_core::{Engine, GeoConfig};

use crate::config::Config;
use crate::store::{self, MemoryStore, RecordStore, StoreError};

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Record store holding the collection
    pub store: Arc<dyn RecordStore>,
    /// Query engine with the configured geo tables
    pub engine: Arc<Engine>,
    /// Shared secret for the ingestion endpoint
    pub admin_password: Option<Arc<str>>,
    /// Key the record list lives under
    pub store_key: Arc<str>,
}

impl AppState {
    /// Build state around an explicit store.
    pub fn new(store: Arc<dyn RecordStore>, engine: Engine, config: &Config) -> Self {
        Self {
            store,
            engine: Arc::new(engine),
            admin_password: config.admin_password.as_deref().map(Arc::from),
            store_key: Arc::from(config.store_key.as_str()),
        }
    }

    /// In-memory state for tests and local development.
    pub fn in_memory(config: &Config) -> Self {
        Self::new(Arc::new(MemoryStore::new()), Engine::default(), config)
    }

    /// Resolve the store backend and geo tables from configuration.
    pub async fn from_config(config: &Config) -> Result<Self, StateError> {
        let geo = match &config.geo_config {
            Some(path) => {
                let geo = GeoConfig::load(path)?;
                tracing::info!(path = %path.display(), "Loaded geo config");
                geo
            }
            None => GeoConfig::default(),
        };

        let store: Arc<dyn RecordStore> = Arc::from(store::from_config(config).await?);
        tracing::info!(backend = store.backend(), key = %config.store_key, "Record store ready");

        Ok(Self::new(store, Engine::new(geo), config))
    }
}

/// Startup failures while building [`AppState`].
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to load geo config: {0}")]
    Geo(#[from] postbox_core::PostboxError),

    #[error("Failed to open record store: {0}")]
    Store(#[from] StoreError),
}
