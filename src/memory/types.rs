//! Core data model for the memory system
//!
//! Defines the atomic retrievable unit, the query descriptor, selection
//! results with their per-signal breakdown, and the append-only feedback
//! record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Importance bounds applied at ingress
pub const IMPORTANCE_MIN: u8 = 1;
pub const IMPORTANCE_MAX: u8 = 10;

/// An atomic retrievable memory unit.
///
/// Immutable as far as the selection core is concerned: content and tags may
/// be regenerated by an external extractor, but selection never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// Unique identifier within a profile
    pub id: String,
    /// Free-text content, typically one to three sentences
    pub content: String,
    /// Short lowercase semantic labels; duplicates coalesced
    pub tags: Vec<String>,
    /// Stability/value signal in [1, 10]
    pub importance: u8,
    /// Creation instant
    pub created_at: DateTime<Utc>,
    /// Ids of co-occurring memories; only the degree count is used
    #[serde(default)]
    pub associations: Vec<String>,
    /// Optional grouping tag, passed through untouched
    #[serde(default)]
    pub episode_id: Option<String>,
}

impl Memory {
    /// Create a new memory, clamping importance into [1, 10] and
    /// lowercasing/deduplicating tags.
    pub fn new(id: impl Into<String>, content: impl Into<String>, importance: u8) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            tags: Vec::new(),
            importance: importance.clamp(IMPORTANCE_MIN, IMPORTANCE_MAX),
            created_at: Utc::now(),
            associations: Vec::new(),
            episode_id: None,
        }
    }

    /// Set the tag set (lowercased, duplicates dropped)
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut seen = HashSet::new();
        self.tags = tags
            .into_iter()
            .map(|t| t.into().to_lowercase())
            .filter(|t| seen.insert(t.clone()))
            .collect();
        self
    }

    /// Set the association edge list
    pub fn with_associations(
        mut self,
        associations: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.associations = associations.into_iter().map(Into::into).collect();
        self
    }

    /// Set the creation instant
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the episode grouping tag
    pub fn with_episode_id(mut self, episode_id: impl Into<String>) -> Self {
        self.episode_id = Some(episode_id.into());
        self
    }

    /// True if any tag matches any of the given keywords, case-insensitively
    pub fn tags_intersect(&self, keywords: &[String]) -> bool {
        self.tags
            .iter()
            .any(|tag| keywords.iter().any(|k| k.eq_ignore_ascii_case(tag)))
    }
}

/// A query descriptor identifying a class of question.
///
/// The id is the second axis of the learned rating key, typically a thread
/// or task id; name and prompt feed the lexical query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptKernel {
    /// Stable identifier for the class of query
    pub id: String,
    /// Human-readable name, concatenated into the query text
    pub name: String,
    /// The prompt text itself
    pub prompt: String,
    /// Short lowercase labels for tag pre-filtering and alignment signals
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl PromptKernel {
    pub fn new(id: impl Into<String>, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prompt: prompt.into(),
            keywords: Vec::new(),
        }
    }

    /// Set the keyword set (lowercased)
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.into().to_lowercase())
            .collect();
        self
    }
}

/// Per-signal breakdown of a selected memory's composite score.
///
/// All components are normalized into [0, 1] before weighting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalBreakdown {
    /// Normalized importance
    pub importance: f64,
    /// Fraction of kernel keywords present in the tag set
    pub tag_relevance: f64,
    /// Log-scaled BM25 score
    pub lexical: f64,
    /// Exponential age decay
    pub recency: f64,
    /// Association-graph degree signal
    pub centrality: f64,
    /// Thompson sample mapped into [0, 1]
    pub thompson: f64,
}

/// A memory chosen by the selection pipeline, in final (MMR) order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedMemory {
    /// Id of the underlying memory
    pub memory_id: String,
    /// Content to inject into the model's context
    pub content: String,
    /// Tag set of the underlying memory
    pub tags: Vec<String>,
    /// Composite utility score
    pub score: f64,
    /// Individual signal values behind the score
    pub signals: SignalBreakdown,
}

/// An append-only feedback record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryInteraction {
    /// Unique record id
    pub id: Uuid,
    /// Memory the feedback applies to
    pub memory_id: String,
    /// Kernel the memory was selected for
    pub kernel_id: String,
    /// Host-supplied context (conversation/turn) identifier
    pub context_id: String,
    /// Reward in {-1, 0, 1}
    pub reward: i8,
    /// When the feedback was recorded
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_importance_clamped() {
        assert_eq!(Memory::new("m1", "content", 0).importance, 1);
        assert_eq!(Memory::new("m2", "content", 5).importance, 5);
        assert_eq!(Memory::new("m3", "content", 200).importance, 10);
    }

    #[test]
    fn test_memory_tags_lowercased_and_deduplicated() {
        let memory = Memory::new("m1", "content", 5).with_tags(["Rust", "rust", "Systems"]);
        assert_eq!(memory.tags, vec!["rust", "systems"]);
    }

    #[test]
    fn test_tags_intersect_case_insensitive() {
        let memory = Memory::new("m1", "content", 5).with_tags(["systems", "databases"]);
        assert!(memory.tags_intersect(&["SYSTEMS".to_string()]));
        assert!(!memory.tags_intersect(&["cooking".to_string()]));
        assert!(!memory.tags_intersect(&[]));
    }

    #[test]
    fn test_kernel_keywords_lowercased() {
        let kernel = PromptKernel::new("k1", "name", "prompt").with_keywords(["Systems"]);
        assert_eq!(kernel.keywords, vec!["systems"]);
    }

    #[test]
    fn test_memory_serialization_round_trip() {
        let memory = Memory::new("m1", "Some fact worth keeping", 7)
            .with_tags(["systems"])
            .with_associations(["m2", "m3"])
            .with_episode_id("ep-1");

        let json = serde_json::to_string(&memory).expect("Failed to serialize memory");
        let back: Memory = serde_json::from_str(&json).expect("Failed to deserialize memory");

        assert_eq!(back.id, memory.id);
        assert_eq!(back.content, memory.content);
        assert_eq!(back.tags, memory.tags);
        assert_eq!(back.importance, memory.importance);
        assert_eq!(back.associations, memory.associations);
        assert_eq!(back.episode_id, memory.episode_id);
    }

    #[test]
    fn test_memory_optional_fields_default() {
        let json = r#"{
            "id": "m1",
            "content": "bare minimum",
            "tags": [],
            "importance": 3,
            "created_at": "2026-01-01T00:00:00Z"
        }"#;
        let memory: Memory = serde_json::from_str(json).expect("Failed to deserialize");
        assert!(memory.associations.is_empty());
        assert!(memory.episode_id.is_none());
    }
}
