use serde::Deserialize;

/// Main configuration structure for Engram
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Memory selection configuration
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Feedback learning configuration
    #[serde(default)]
    pub learning: LearningConfig,
}

/// Configuration for the memory selection pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    /// Default number of memories to return per selection
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Multiplier for the weighted oversampling pool size
    #[serde(default = "default_oversample_multiplier")]
    pub oversample_multiplier: usize,
    /// MMR trade-off between score and novelty (1.0 = pure score)
    #[serde(default = "default_mmr_lambda")]
    pub mmr_lambda: f64,
    /// Half-life for recency decay, in days
    #[serde(default = "default_recency_half_life_days")]
    pub recency_half_life_days: f64,
    /// Relative weights of the composite utility signals
    #[serde(default)]
    pub weights: SignalWeights,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            oversample_multiplier: default_oversample_multiplier(),
            mmr_lambda: default_mmr_lambda(),
            recency_half_life_days: default_recency_half_life_days(),
            weights: SignalWeights::default(),
        }
    }
}

fn default_limit() -> usize {
    20
}

fn default_oversample_multiplier() -> usize {
    3
}

fn default_mmr_lambda() -> f64 {
    0.7
}

fn default_recency_half_life_days() -> f64 {
    14.0
}

/// Relative weights of the six composite utility signals.
///
/// The defaults sum to 1.0, which keeps the composite score in [0, 1].
#[derive(Debug, Clone, Deserialize)]
pub struct SignalWeights {
    /// User/extractor-assigned importance
    #[serde(default = "default_importance_weight")]
    pub importance: f64,
    /// Fraction of kernel keywords present in the memory's tags
    #[serde(default = "default_tag_relevance_weight")]
    pub tag_relevance: f64,
    /// Log-scaled BM25 score against the kernel query
    #[serde(default = "default_lexical_weight")]
    pub lexical: f64,
    /// Exponential age decay
    #[serde(default = "default_recency_weight")]
    pub recency: f64,
    /// Association-graph degree
    #[serde(default = "default_centrality_weight")]
    pub centrality: f64,
    /// Thompson sample from the learned rating posterior
    #[serde(default = "default_thompson_weight")]
    pub thompson: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            importance: default_importance_weight(),
            tag_relevance: default_tag_relevance_weight(),
            lexical: default_lexical_weight(),
            recency: default_recency_weight(),
            centrality: default_centrality_weight(),
            thompson: default_thompson_weight(),
        }
    }
}

fn default_importance_weight() -> f64 {
    0.10
}

fn default_tag_relevance_weight() -> f64 {
    0.25
}

fn default_lexical_weight() -> f64 {
    0.30
}

fn default_recency_weight() -> f64 {
    0.10
}

fn default_centrality_weight() -> f64 {
    0.10
}

fn default_thompson_weight() -> f64 {
    0.15
}

/// Configuration for the feedback learning loop
#[derive(Debug, Clone, Deserialize)]
pub struct LearningConfig {
    /// Maximum number of interaction records retained per profile
    #[serde(default = "default_max_interactions")]
    pub max_interactions: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            max_interactions: default_max_interactions(),
        }
    }
}

fn default_max_interactions() -> usize {
    1000
}
