//! In-memory settings store
//!
//! Reference backend for tests and embedded hosts that do not need
//! persistence across restarts.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::storage::SettingsStore;

/// Settings store backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    settings: RwLock<HashMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
    async fn get_setting(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.settings.read().await.get(key).cloned())
    }

    async fn save_setting(&self, key: &str, value: Value) -> Result<()> {
        self.settings.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_setting(&self, key: &str) -> Result<()> {
        self.settings.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.settings.read().await.keys().cloned().collect())
    }
}
