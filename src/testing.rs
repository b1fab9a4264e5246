//! Test utilities for engram - shared fixtures and builders
//!
//! Deterministic helpers used by unit and integration tests: a seeded RNG
//! constructor and compact builders for memories, kernels, and converged
//! rating tables.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::memory::rating::{MemoryRating, RatingTable, SIGMA_MIN};
use crate::memory::types::{Memory, PromptKernel};

/// RNG with a pinned seed, so stochastic stages replay identically.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Memory with content and tags, mid-range importance, created now.
pub fn memory_fixture(id: &str, content: &str, tags: &[&str]) -> Memory {
    Memory::new(id, content, 5).with_tags(tags.iter().copied())
}

/// Kernel with a prompt and keywords.
pub fn kernel_fixture(id: &str, prompt: &str, keywords: &[&str]) -> PromptKernel {
    PromptKernel::new(id, "", prompt).with_keywords(keywords.iter().copied())
}

/// Rating table where each listed (memory, kernel) pair has a converged
/// posterior: mu = 0 and sigma at its floor.
///
/// Useful when a test needs Thompson noise damped to near zero so that the
/// deterministic signals dominate the composite score.
pub fn converged_ratings(kernel_id: &str, memory_ids: &[&str]) -> RatingTable {
    let mut table = RatingTable::new();
    for memory_id in memory_ids {
        let mut rating = MemoryRating::new(*memory_id, kernel_id);
        rating.sigma = SIGMA_MIN;
        table.insert(rating);
    }
    table
}
