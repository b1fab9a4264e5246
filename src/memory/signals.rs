//! Scalar relevance signals
//!
//! Each signal maps a memory (and, where relevant, the kernel) to a value
//! in [0, 1]. These are fused with the lexical and Thompson components by
//! the selection pipeline.

use chrono::{DateTime, Utc};

use crate::memory::types::Memory;

/// Centrality boost applied when the memory's tags overlap the kernel keywords
const CENTRALITY_SPIN: f64 = 1.25;

/// Association degree at which centrality saturates
const CENTRALITY_SATURATION: f64 = 10.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Normalize raw importance (1..=10) into [0, 1].
pub fn importance_signal(importance: u8) -> f64 {
    ((f64::from(importance) - 1.0) / 9.0).clamp(0.0, 1.0)
}

/// Fraction of kernel keywords present in the memory's tag set.
///
/// Case-insensitive; 0.0 when either side is empty. The denominator is the
/// kernel keyword count, so a memory tagged with every keyword scores 1.0.
pub fn tag_relevance_signal(memory: &Memory, keywords: &[String]) -> f64 {
    if keywords.is_empty() || memory.tags.is_empty() {
        return 0.0;
    }
    let matched = keywords
        .iter()
        .filter(|keyword| {
            memory
                .tags
                .iter()
                .any(|tag| tag.eq_ignore_ascii_case(keyword))
        })
        .count();
    matched as f64 / keywords.len() as f64
}

/// Exponential age decay with a configurable half-life.
///
/// Future timestamps are treated as now (age floored at zero), so the signal
/// never exceeds 1.0.
pub fn recency_signal(created_at: DateTime<Utc>, now: DateTime<Utc>, half_life_days: f64) -> f64 {
    let age_ms = (now - created_at).num_milliseconds().max(0) as f64;
    let half_life_ms = (half_life_days * MS_PER_DAY).max(1.0);
    (-age_ms / half_life_ms).exp()
}

/// Association-graph degree signal.
///
/// Degree scaled by a spin factor when the memory's tags overlap the kernel
/// keywords, saturating at 10 effective associations.
pub fn centrality_signal(memory: &Memory, keywords: &[String]) -> f64 {
    let spin = if memory.tags_intersect(keywords) {
        CENTRALITY_SPIN
    } else {
        1.0
    };
    (memory.associations.len() as f64 * spin / CENTRALITY_SATURATION).min(1.0)
}
