//! Diversity-aware selection
//!
//! Two stages: weighted random oversampling without replacement (injecting
//! stochasticity beyond Thompson alone, so identical queries do not always
//! produce identical selections), then Maximal Marginal Relevance re-ranking
//! over 3-shingle Jaccard to remove near-duplicate snippets.

use rand::Rng;
use std::collections::HashSet;

use crate::lexical::tokenizer::{SHINGLE_SIZE, shingle_jaccard, shingles, tokenize};

/// Draw up to `k` items without replacement, weighted by `weights`.
///
/// Negative weights count as zero for sampling probability but the item
/// stays in the pool, so it can still be drawn uniformly once every
/// remaining weight is zero. If float round-off walks the cursor past the
/// end, the index clamps to the last element.
pub fn weighted_sample<T>(
    items: Vec<T>,
    weights: &[f64],
    k: usize,
    rng: &mut impl Rng,
) -> Vec<T> {
    debug_assert_eq!(items.len(), weights.len());

    let mut pool: Vec<(T, f64)> = items
        .into_iter()
        .zip(weights.iter().copied())
        .collect();
    let mut drawn = Vec::with_capacity(k.min(pool.len()));

    while drawn.len() < k && !pool.is_empty() {
        let total: f64 = pool.iter().map(|(_, w)| w.max(0.0)).sum();

        let index = if total <= 0.0 {
            rng.gen_range(0..pool.len())
        } else {
            let target = rng.gen_range(0.0..total);
            let mut running = 0.0;
            let mut chosen = pool.len() - 1;
            for (i, (_, weight)) in pool.iter().enumerate() {
                running += weight.max(0.0);
                if running > target {
                    chosen = i;
                    break;
                }
            }
            chosen
        };

        drawn.push(pool.remove(index).0);
    }

    drawn
}

/// Greedy Maximal Marginal Relevance re-ranking.
///
/// At each step the remaining candidate with the largest
/// `lambda * score - (1 - lambda) * max_similarity_to_selected` wins; ties
/// go to the earlier candidate, so a score-descending input yields a
/// deterministic result. Similarity is Jaccard over 3-shingle sets of the
/// candidates' content.
pub fn select_by_mmr<T>(
    pool: Vec<T>,
    lambda: f64,
    limit: usize,
    score: impl Fn(&T) -> f64,
    content: impl Fn(&T) -> &str,
) -> Vec<T> {
    let mut remaining: Vec<(T, HashSet<String>)> = pool
        .into_iter()
        .map(|item| {
            let shingle_set = shingles(&tokenize(content(&item)), SHINGLE_SIZE);
            (item, shingle_set)
        })
        .collect();

    let mut selected = Vec::with_capacity(limit.min(remaining.len()));
    let mut selected_shingles: Vec<HashSet<String>> = Vec::new();

    while selected.len() < limit && !remaining.is_empty() {
        let mut best_index = 0;
        let mut best_mmr = f64::NEG_INFINITY;

        for (i, (item, shingle_set)) in remaining.iter().enumerate() {
            let max_similarity = selected_shingles
                .iter()
                .map(|chosen| shingle_jaccard(shingle_set, chosen))
                .fold(0.0, f64::max);
            let mmr = lambda * score(item) - (1.0 - lambda) * max_similarity;
            if mmr > best_mmr {
                best_mmr = mmr;
                best_index = i;
            }
        }

        let (item, shingle_set) = remaining.remove(best_index);
        selected_shingles.push(shingle_set);
        selected.push(item);
    }

    selected
}
