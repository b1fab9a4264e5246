//! Storage interface and backends
//!
//! The learning loop persists rating tables and interaction logs through a
//! small injected settings-store capability. Any backend satisfying the
//! trait works; an in-memory reference backend ships with the crate.

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use memory::InMemoryStore;

/// Key-value settings store used by the learning loop.
///
/// Passed explicitly as a capability (`Arc<dyn SettingsStore>`), never held
/// in process-wide state. Payloads are JSON values; callers own the schema
/// of what they store under each key.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch the value stored under `key`, if any
    async fn get_setting(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value
    async fn save_setting(&self, key: &str, value: Value) -> Result<()>;

    /// Delete the value stored under `key`, if any
    async fn remove_setting(&self, key: &str) -> Result<()>;

    /// List every stored key
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Storage key for a profile's rating table
pub fn ratings_key(profile_id: &str) -> String {
    format!("memory_ratings_{profile_id}")
}

/// Storage key for a profile's interaction log
pub fn interactions_key(profile_id: &str) -> String {
    format!("memory_interactions_{profile_id}")
}
