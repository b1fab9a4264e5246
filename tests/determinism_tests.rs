//! Determinism tests for the selection pipeline
//!
//! Selection draws all randomness from a caller-supplied RNG: identical
//! inputs, identical rating state, and an identical seed must reproduce the
//! exact same output, while feedback applied between calls must be visible
//! to the next selection.

use std::sync::Arc;

use engram::memory::{LearningPipeline, SelectionOptions, SelectionPipeline};
use engram::storage::InMemoryStore;
use engram::testing::{kernel_fixture, memory_fixture, seeded_rng};

fn corpus() -> Vec<engram::memory::Memory> {
    (0..40)
        .map(|i| {
            memory_fixture(
                &format!("m{i}"),
                &format!("note item{i} about write ahead logging and checkpoints"),
                &["storage"],
            )
        })
        .collect()
}

#[test]
fn test_same_seed_reproduces_selection() {
    let pipeline = SelectionPipeline::with_defaults();
    let memories = corpus();
    let kernel = kernel_fixture("k1", "write ahead logging", &["storage"]);
    let ratings = engram::memory::RatingTable::new();
    let options = SelectionOptions {
        limit: Some(8),
        ..Default::default()
    };

    let mut rng_a = seeded_rng(2024);
    let first = pipeline.select(&memories, &kernel, &ratings, &options, &mut rng_a);

    let mut rng_b = seeded_rng(2024);
    let second = pipeline.select(&memories, &kernel, &ratings, &options, &mut rng_b);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.memory_id, b.memory_id);
        assert_eq!(a.score, b.score);
        assert_eq!(a.signals.thompson, b.signals.thompson);
    }
}

#[test]
fn test_different_seeds_may_reorder_but_stay_valid() {
    let pipeline = SelectionPipeline::with_defaults();
    let memories = corpus();
    let kernel = kernel_fixture("k1", "write ahead logging", &["storage"]);
    let ratings = engram::memory::RatingTable::new();
    let options = SelectionOptions {
        limit: Some(8),
        ..Default::default()
    };

    for seed in 0..20 {
        let mut rng = seeded_rng(seed);
        let result = pipeline.select(&memories, &kernel, &ratings, &options, &mut rng);
        assert_eq!(result.len(), 8);
        for selected in &result {
            assert!((0.0..=1.0).contains(&selected.score));
        }
    }
}

#[tokio::test]
async fn test_feedback_is_visible_to_subsequent_selections() {
    let store = Arc::new(InMemoryStore::new());
    let learning = LearningPipeline::with_defaults(store);
    let selection = SelectionPipeline::with_defaults();

    let memories = corpus();
    let kernel = kernel_fixture("k1", "write ahead logging", &["storage"]);

    // Drive m7's rating decisively upward while the rest converge at neutral
    for _ in 0..30 {
        let rewards: Vec<(String, i8)> = memories
            .iter()
            .map(|m| (m.id.clone(), i8::from(m.id == "m7")))
            .collect();
        learning
            .apply_feedback("p1", "k1", "c1", &rewards)
            .await
            .unwrap();
    }

    let ratings = learning.load_ratings("p1").await.unwrap();
    let trained = ratings.get("m7", "k1").expect("m7 should have a rating");
    assert!(trained.mu > 0.9);
    assert!(trained.sigma < 0.5);
    assert_eq!(trained.uses, 30);
    let neutral = ratings.get("m3", "k1").expect("m3 should have a rating");
    assert_eq!(neutral.mu, 0.0);

    // The trained rating now feeds the next selection's Thompson term; the
    // default limit oversamples the whole candidate set, so the ranking is
    // driven by the scores alone
    let mut rng = seeded_rng(3);
    let result = selection.select(
        &memories,
        &kernel,
        &ratings,
        &SelectionOptions::default(),
        &mut rng,
    );
    let position = result
        .iter()
        .position(|s| s.memory_id == "m7")
        .expect("m7 should be selected");
    assert!(
        position < 3,
        "A strongly positive rating should push m7 to the front, got rank {position}"
    );
}
