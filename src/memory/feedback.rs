//! Feedback learning loop
//!
//! Applies explicit and implicit feedback to the per-(memory, kernel)
//! ratings and appends interaction records, persisting both through the
//! injected settings store. A stored table that fails to parse is treated
//! as empty and logged; storage failures propagate to the caller, because
//! silently dropped feedback is user-visible.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::config::LearningConfig;
use crate::error::{EngramError, Result};
use crate::memory::rating::{MemoryRating, RatingTable};
use crate::memory::types::MemoryInteraction;
use crate::storage::{SettingsStore, interactions_key, ratings_key};

/// Pipeline for applying feedback and persisting learned state.
pub struct LearningPipeline {
    store: Arc<dyn SettingsStore>,
    config: LearningConfig,
}

impl LearningPipeline {
    pub fn new(store: Arc<dyn SettingsStore>, config: LearningConfig) -> Self {
        Self { store, config }
    }

    /// Create a pipeline with default configuration
    pub fn with_defaults(store: Arc<dyn SettingsStore>) -> Self {
        Self::new(store, LearningConfig::default())
    }

    /// Load a profile's rating table.
    ///
    /// A missing or unparseable stored table yields an empty table; the
    /// corrupt case is logged and recovered-by-reset on the next save.
    pub async fn load_ratings(&self, profile_id: &str) -> Result<RatingTable> {
        let key = ratings_key(profile_id);
        let Some(value) = self.store.get_setting(&key).await? else {
            return Ok(RatingTable::new());
        };

        match serde_json::from_value::<Vec<MemoryRating>>(value) {
            Ok(records) => Ok(RatingTable::from_records(records)),
            Err(error) => {
                warn!(profile_id, %error, "Stored rating table is corrupt; starting empty");
                Ok(RatingTable::new())
            }
        }
    }

    /// Persist a profile's rating table as a flat array of records.
    pub async fn save_ratings(&self, profile_id: &str, table: &RatingTable) -> Result<()> {
        let value = serde_json::to_value(table.to_records())
            .map_err(|e| EngramError::Serialization(e.to_string()))?;
        self.store.save_setting(&ratings_key(profile_id), value).await
    }

    /// Load a profile's interaction log, most recent last.
    pub async fn load_interactions(&self, profile_id: &str) -> Result<Vec<MemoryInteraction>> {
        let key = interactions_key(profile_id);
        let Some(value) = self.store.get_setting(&key).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_value::<Vec<MemoryInteraction>>(value) {
            Ok(interactions) => Ok(interactions),
            Err(error) => {
                warn!(profile_id, %error, "Stored interaction log is corrupt; starting empty");
                Ok(Vec::new())
            }
        }
    }

    /// Apply a batch of rewards for one (kernel, context) and persist.
    ///
    /// Each reward updates the matching rating (initializing it if absent)
    /// and appends one interaction record. The interaction log keeps only
    /// the most recent entries, in original order.
    pub async fn apply_feedback(
        &self,
        profile_id: &str,
        kernel_id: &str,
        context_id: &str,
        rewards: &[(String, i8)],
    ) -> Result<()> {
        if rewards.is_empty() {
            return Ok(());
        }

        let mut ratings = self.load_ratings(profile_id).await?;
        let mut interactions = self.load_interactions(profile_id).await?;

        let now = Utc::now();
        for (memory_id, reward) in rewards {
            ratings.get_or_init(memory_id, kernel_id).apply_reward(*reward);
            interactions.push(MemoryInteraction {
                id: Uuid::new_v4(),
                memory_id: memory_id.clone(),
                kernel_id: kernel_id.to_string(),
                context_id: context_id.to_string(),
                reward: (*reward).clamp(-1, 1),
                timestamp: now,
            });
        }

        self.save_ratings(profile_id, &ratings).await?;
        self.save_interactions(profile_id, interactions).await
    }

    /// Record that memories were selected and presumed useful.
    ///
    /// Equivalent to `apply_feedback` with reward +1 per memory: the
    /// implicit signal of the host loop injecting a memory into context.
    pub async fn record_usage(
        &self,
        profile_id: &str,
        kernel_id: &str,
        context_id: &str,
        memory_ids: &[String],
    ) -> Result<()> {
        let rewards: Vec<(String, i8)> = memory_ids.iter().map(|id| (id.clone(), 1)).collect();
        self.apply_feedback(profile_id, kernel_id, context_id, &rewards)
            .await
    }

    /// Persist the interaction log, truncated to the retention cap.
    async fn save_interactions(
        &self,
        profile_id: &str,
        mut interactions: Vec<MemoryInteraction>,
    ) -> Result<()> {
        let cap = self.config.max_interactions;
        if interactions.len() > cap {
            interactions.drain(..interactions.len() - cap);
        }

        let value: Value = serde_json::to_value(&interactions)
            .map_err(|e| EngramError::Serialization(e.to_string()))?;
        self.store
            .save_setting(&interactions_key(profile_id), value)
            .await
    }
}
