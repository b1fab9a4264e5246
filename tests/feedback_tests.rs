//! Integration tests for the feedback learning loop
//!
//! Covers the Kalman update numerics, implicit usage recording, persistence
//! round-trips, interaction retention, and storage failure propagation.

use std::sync::Arc;

use async_trait::async_trait;
use engram::EngramError;
use engram::config::LearningConfig;
use engram::error::Result;
use engram::memory::LearningPipeline;
use engram::storage::{InMemoryStore, SettingsStore, interactions_key, ratings_key};
use serde_json::Value;

fn pipeline_with_store() -> (LearningPipeline, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    (LearningPipeline::with_defaults(store.clone()), store)
}

mod rating_updates {
    use super::*;

    #[tokio::test]
    async fn test_single_positive_reward_numerics() {
        let (pipeline, _) = pipeline_with_store();
        pipeline
            .apply_feedback("p1", "k1", "c1", &[("m1".to_string(), 1)])
            .await
            .unwrap();

        let table = pipeline.load_ratings("p1").await.unwrap();
        let rating = table.get("m1", "k1").expect("Rating should be initialized");

        // Kalman gain 1/(1+1) from sigma=1, then drift, clamp is a no-op
        assert!((rating.mu - 0.5).abs() < 1e-6, "mu = {}", rating.mu);
        assert!(
            (rating.sigma - (0.5f64.sqrt() + 0.01)).abs() < 1e-6,
            "sigma = {}",
            rating.sigma
        );
        assert_eq!(rating.uses, 1);
    }

    #[tokio::test]
    async fn test_repeated_feedback_accumulates_uses() {
        let (pipeline, _) = pipeline_with_store();
        for _ in 0..5 {
            pipeline
                .apply_feedback("p1", "k1", "c1", &[("m1".to_string(), 1)])
                .await
                .unwrap();
        }

        let table = pipeline.load_ratings("p1").await.unwrap();
        let rating = table.get("m1", "k1").unwrap();
        assert_eq!(rating.uses, 5);
        assert!(rating.mu > 0.5, "Mean should keep moving toward +1");
        assert!((0.1..=2.0).contains(&rating.sigma));
    }

    #[tokio::test]
    async fn test_ratings_keyed_per_kernel() {
        let (pipeline, _) = pipeline_with_store();
        pipeline
            .apply_feedback("p1", "k1", "c1", &[("m1".to_string(), 1)])
            .await
            .unwrap();
        pipeline
            .apply_feedback("p1", "k2", "c1", &[("m1".to_string(), -1)])
            .await
            .unwrap();

        let table = pipeline.load_ratings("p1").await.unwrap();
        assert!(table.get("m1", "k1").unwrap().mu > 0.0);
        assert!(table.get("m1", "k2").unwrap().mu < 0.0);
    }
}

mod implicit_usage {
    use super::*;

    #[tokio::test]
    async fn test_record_usage_rewards_each_memory() {
        let (pipeline, _) = pipeline_with_store();
        pipeline
            .record_usage(
                "p1",
                "k1",
                "c1",
                &["m1".to_string(), "m2".to_string()],
            )
            .await
            .unwrap();

        let interactions = pipeline.load_interactions("p1").await.unwrap();
        assert_eq!(interactions.len(), 2);
        assert!(interactions.iter().all(|i| i.reward == 1));
        assert!(interactions.iter().all(|i| i.context_id == "c1"));

        let table = pipeline.load_ratings("p1").await.unwrap();
        assert_eq!(table.get("m1", "k1").unwrap().uses, 1);
        assert_eq!(table.get("m2", "k1").unwrap().uses, 1);
    }
}

mod persistence {
    use super::*;

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let (pipeline, _) = pipeline_with_store();
        pipeline
            .apply_feedback(
                "p1",
                "k1",
                "c1",
                &[("m1".to_string(), 1), ("m2".to_string(), 0)],
            )
            .await
            .unwrap();

        let first = pipeline.load_ratings("p1").await.unwrap();
        pipeline.save_ratings("p1", &first).await.unwrap();
        let second = pipeline.load_ratings("p1").await.unwrap();

        assert_eq!(first.len(), second.len());
        for records in [first.to_records(), second.to_records()] {
            assert_eq!(records.len(), 2);
        }
        let a = first.get("m1", "k1").unwrap();
        let b = second.get("m1", "k1").unwrap();
        assert_eq!(a.mu, b.mu);
        assert_eq!(a.sigma, b.sigma);
        assert_eq!(a.uses, b.uses);
    }

    #[tokio::test]
    async fn test_ratings_stored_as_array_of_records() {
        let (pipeline, store) = pipeline_with_store();
        pipeline
            .apply_feedback("p1", "k1", "c1", &[("m1".to_string(), 1)])
            .await
            .unwrap();

        let raw = store
            .get_setting(&ratings_key("p1"))
            .await
            .unwrap()
            .expect("Table should be persisted");
        let array = raw.as_array().expect("On-disk form should be an array");
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["memory_id"], "m1");
        assert_eq!(array[0]["kernel_id"], "k1");
    }

    #[tokio::test]
    async fn test_interaction_log_capped_in_original_order() {
        let store = Arc::new(InMemoryStore::new());
        let pipeline = LearningPipeline::new(store, LearningConfig::default());

        for i in 0..1500 {
            pipeline
                .apply_feedback("p1", "k1", &format!("c{i}"), &[("m1".to_string(), 1)])
                .await
                .unwrap();
        }

        let interactions = pipeline.load_interactions("p1").await.unwrap();
        assert_eq!(interactions.len(), 1000);
        assert_eq!(interactions[0].context_id, "c500");
        assert_eq!(interactions[999].context_id, "c1499");

        // Original order preserved between the survivors
        for window in interactions.windows(2) {
            let a: usize = window[0].context_id[1..].parse().unwrap();
            let b: usize = window[1].context_id[1..].parse().unwrap();
            assert_eq!(b, a + 1);
        }
    }

    #[tokio::test]
    async fn test_custom_retention_cap() {
        let store = Arc::new(InMemoryStore::new());
        let pipeline = LearningPipeline::new(
            store,
            LearningConfig {
                max_interactions: 10,
            },
        );

        for i in 0..25 {
            pipeline
                .apply_feedback("p1", "k1", &format!("c{i}"), &[("m1".to_string(), 0)])
                .await
                .unwrap();
        }

        let interactions = pipeline.load_interactions("p1").await.unwrap();
        assert_eq!(interactions.len(), 10);
        assert_eq!(interactions[0].context_id, "c15");
    }
}

mod failure_handling {
    use super::*;

    /// Store whose writes always fail
    struct BrokenStore;

    #[async_trait]
    impl SettingsStore for BrokenStore {
        async fn get_setting(&self, _key: &str) -> Result<Option<Value>> {
            Ok(None)
        }

        async fn save_setting(&self, _key: &str, _value: Value) -> Result<()> {
            Err(EngramError::Storage("disk on fire".to_string()))
        }

        async fn remove_setting(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        async fn keys(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_write_failure_propagates_to_caller() {
        let pipeline = LearningPipeline::with_defaults(Arc::new(BrokenStore));
        let result = pipeline
            .apply_feedback("p1", "k1", "c1", &[("m1".to_string(), 1)])
            .await;

        assert!(matches!(result, Err(EngramError::Storage(_))));
    }

    #[tokio::test]
    async fn test_corrupt_table_does_not_block_feedback() {
        let (pipeline, store) = pipeline_with_store();
        store
            .save_setting(&ratings_key("p1"), serde_json::json!("garbage"))
            .await
            .unwrap();
        store
            .save_setting(&interactions_key("p1"), serde_json::json!({"bad": true}))
            .await
            .unwrap();

        pipeline
            .apply_feedback("p1", "k1", "c1", &[("m1".to_string(), 1)])
            .await
            .unwrap();

        let table = pipeline.load_ratings("p1").await.unwrap();
        assert_eq!(table.len(), 1);
        let interactions = pipeline.load_interactions("p1").await.unwrap();
        assert_eq!(interactions.len(), 1);
    }
}
