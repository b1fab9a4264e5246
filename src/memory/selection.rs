//! Memory selection pipeline
//!
//! Orchestrates one selection pass: tag pre-filter, corpus statistics over
//! the filtered candidates, composite utility scoring, weighted
//! oversampling, and MMR re-ranking. Selection is pure and total: it never
//! fails, performs no I/O, and treats the rating table as a read-only
//! snapshot.

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::config::SelectionConfig;
use crate::lexical::{CorpusStats, bm25_score, tokenize};
use crate::memory::rating::{INITIAL_SIGMA, RatingTable, thompson_sample};
use crate::memory::signals::{
    centrality_signal, importance_signal, recency_signal, tag_relevance_signal,
};
use crate::memory::types::{Memory, PromptKernel, SelectedMemory, SignalBreakdown};

/// Divisor applied to ln(1 + bm25) when mapping the lexical score into [0, 1]
const LEXICAL_LOG_SCALE: f64 = 5.0;

/// Per-call options for a selection pass.
#[derive(Debug, Clone, Default)]
pub struct SelectionOptions {
    /// Override for the configured result limit
    pub limit: Option<usize>,
    /// Skip the tag pre-filter and score every candidate
    pub bypass_tag_filter: bool,
    /// Extra terms appended to the lexical query
    pub query_terms: Vec<String>,
}

struct ScoredCandidate<'a> {
    memory: &'a Memory,
    score: f64,
    signals: SignalBreakdown,
}

/// Selection pipeline over a candidate memory set.
///
/// Stage 1: pre-filter candidates by tag/keyword overlap
/// Stage 2: score each survivor with the weighted composite of six signals
/// Stage 3: oversample ~3x the limit by composite weight, then re-rank the
/// pool with MMR and return the top results
pub struct SelectionPipeline {
    config: SelectionConfig,
}

impl SelectionPipeline {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// Create a pipeline with default configuration
    pub fn with_defaults() -> Self {
        Self::new(SelectionConfig::default())
    }

    /// Select memories for a kernel.
    ///
    /// `ratings` is a read-only snapshot; pairs without a learned rating are
    /// treated as fresh (mu = 0, sigma = 1). All stochastic draws come from
    /// the caller-supplied RNG, so a seeded RNG plus identical inputs yields
    /// identical output.
    pub fn select(
        &self,
        memories: &[Memory],
        kernel: &PromptKernel,
        ratings: &RatingTable,
        options: &SelectionOptions,
        rng: &mut impl Rng,
    ) -> Vec<SelectedMemory> {
        let limit = options.limit.unwrap_or(self.config.limit);
        if memories.is_empty() || limit == 0 {
            return Vec::new();
        }

        let candidates = self.pre_filter(memories, kernel, options);
        if candidates.is_empty() {
            debug!(kernel_id = %kernel.id, "No candidates survived the tag pre-filter");
            return Vec::new();
        }

        let documents: Vec<Vec<String>> = candidates
            .iter()
            .map(|memory| tokenize(&memory.content))
            .collect();
        let stats = CorpusStats::from_documents(&documents);

        let query_text = format!(
            "{} {} {} {}",
            kernel.name,
            kernel.prompt,
            kernel.keywords.join(" "),
            options.query_terms.join(" ")
        );
        let query_tokens = tokenize(&query_text);

        let now = Utc::now();
        let weights = &self.config.weights;
        let scored: Vec<ScoredCandidate> = candidates
            .iter()
            .zip(documents.iter())
            .map(|(&memory, doc_tokens)| {
                let raw_bm25 = bm25_score(&query_tokens, doc_tokens, &stats);
                let (mu, sigma) = ratings
                    .get(&memory.id, &kernel.id)
                    .map(|rating| (rating.mu, rating.sigma))
                    .unwrap_or((0.0, INITIAL_SIGMA));
                let sample = thompson_sample(mu, sigma, rng);

                let signals = SignalBreakdown {
                    importance: importance_signal(memory.importance),
                    tag_relevance: tag_relevance_signal(memory, &kernel.keywords),
                    lexical: ((1.0 + raw_bm25).ln() / LEXICAL_LOG_SCALE).clamp(0.0, 1.0),
                    recency: recency_signal(
                        memory.created_at,
                        now,
                        self.config.recency_half_life_days,
                    ),
                    centrality: centrality_signal(memory, &kernel.keywords),
                    thompson: ((sample + 1.0) / 2.0).clamp(0.0, 1.0),
                };

                let score = weights.importance * signals.importance
                    + weights.tag_relevance * signals.tag_relevance
                    + weights.lexical * signals.lexical
                    + weights.recency * signals.recency
                    + weights.centrality * signals.centrality
                    + weights.thompson * signals.thompson;

                ScoredCandidate {
                    memory,
                    score,
                    signals,
                }
            })
            .collect();

        let pool_size = (limit * self.config.oversample_multiplier).min(scored.len());
        let sample_weights: Vec<f64> = scored.iter().map(|c| c.score).collect();
        let mut pool = crate::memory::diversity::weighted_sample(
            scored,
            &sample_weights,
            pool_size,
            rng,
        );
        pool.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        debug!(
            kernel_id = %kernel.id,
            candidates = candidates.len(),
            pool = pool.len(),
            limit,
            "Re-ranking oversampled pool"
        );

        let diversified = crate::memory::diversity::select_by_mmr(
            pool,
            self.config.mmr_lambda,
            limit,
            |candidate| candidate.score,
            |candidate| candidate.memory.content.as_str(),
        );

        diversified
            .into_iter()
            .map(|candidate| SelectedMemory {
                memory_id: candidate.memory.id.clone(),
                content: candidate.memory.content.clone(),
                tags: candidate.memory.tags.clone(),
                score: candidate.score,
                signals: candidate.signals,
            })
            .collect()
    }

    /// Retain candidates whose tags intersect the kernel keywords.
    ///
    /// Keeps everything when the kernel has no keywords or the caller
    /// bypasses the filter.
    fn pre_filter<'a>(
        &self,
        memories: &'a [Memory],
        kernel: &PromptKernel,
        options: &SelectionOptions,
    ) -> Vec<&'a Memory> {
        if kernel.keywords.is_empty() || options.bypass_tag_filter {
            return memories.iter().collect();
        }
        memories
            .iter()
            .filter(|memory| memory.tags_intersect(&kernel.keywords))
            .collect()
    }
}

impl Default for SelectionPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}
