//! Learned per-(memory, kernel) utility ratings
//!
//! Each rating is a Normal posterior over latent utility. Selection draws a
//! Thompson sample per candidate; feedback applies a scalar Kalman update
//! where the reward is a noisy observation of the latent value. A small
//! drift term keeps the posterior from collapsing, preserving long-run
//! exploration.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::TAU;

/// Standard deviation of the reward observation noise
pub const OBSERVATION_SIGMA: f64 = 1.0;

/// Additive uncertainty drift applied on every update
pub const DRIFT_SIGMA: f64 = 0.01;

/// Posterior standard deviation bounds after an update
pub const SIGMA_MIN: f64 = 0.1;
pub const SIGMA_MAX: f64 = 2.0;

/// Initial posterior standard deviation for a fresh rating
pub const INITIAL_SIGMA: f64 = 1.0;

/// Guard against log(0) in the Box-Muller transform
const UNIFORM_FLOOR: f64 = 1e-9;

/// Guard against a negative posterior variance from float round-off
const VARIANCE_FLOOR: f64 = 1e-6;

/// Compound key for a (memory, kernel) rating pair.
pub fn rating_key(memory_id: &str, kernel_id: &str) -> String {
    format!("{memory_id}::{kernel_id}")
}

/// Bayesian utility estimate for one (memory, kernel) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRating {
    /// Memory axis of the compound key
    pub memory_id: String,
    /// Kernel axis of the compound key
    pub kernel_id: String,
    /// Posterior mean utility
    pub mu: f64,
    /// Posterior standard deviation, kept within [SIGMA_MIN, SIGMA_MAX]
    pub sigma: f64,
    /// Number of feedback events applied
    pub uses: u64,
    /// Instant of the most recent update
    pub last_updated_at: DateTime<Utc>,
}

impl MemoryRating {
    /// Fresh rating: mu = 0, sigma = 1, no uses.
    pub fn new(memory_id: impl Into<String>, kernel_id: impl Into<String>) -> Self {
        Self {
            memory_id: memory_id.into(),
            kernel_id: kernel_id.into(),
            mu: 0.0,
            sigma: INITIAL_SIGMA,
            uses: 0,
            last_updated_at: Utc::now(),
        }
    }

    /// Compound key of this rating
    pub fn key(&self) -> String {
        rating_key(&self.memory_id, &self.kernel_id)
    }

    /// Apply one reward observation with a scalar Kalman step.
    ///
    /// The posterior mean moves toward the reward by the Kalman gain; the
    /// posterior deviation shrinks with evidence, then receives the drift
    /// term and is clamped into [SIGMA_MIN, SIGMA_MAX]. Clamping happens
    /// after the drift is added.
    pub fn apply_reward(&mut self, reward: i8) {
        let reward = f64::from(reward.clamp(-1, 1));

        let variance = self.sigma * self.sigma;
        let observation_variance = OBSERVATION_SIGMA * OBSERVATION_SIGMA;
        let gain = variance / (variance + observation_variance);

        self.mu += gain * (reward - self.mu);
        let posterior_sigma = ((1.0 - gain) * variance).max(VARIANCE_FLOOR).sqrt();
        self.sigma = (posterior_sigma + DRIFT_SIGMA).clamp(SIGMA_MIN, SIGMA_MAX);
        self.uses += 1;
        self.last_updated_at = Utc::now();
    }
}

/// Draw one sample from Normal(mu, sigma) via the Box-Muller transform.
///
/// The first uniform is floored away from zero so the logarithm stays
/// finite; no NaN or infinity can escape.
pub fn thompson_sample(mu: f64, sigma: f64, rng: &mut impl Rng) -> f64 {
    let u1 = rng.gen_range(0.0..1.0f64).max(UNIFORM_FLOOR);
    let u2 = rng.gen_range(0.0..1.0f64).max(UNIFORM_FLOOR);
    let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
    mu + sigma * z
}

/// Keyed rating table for one profile.
///
/// Sparse: absent keys mean a fresh rating. Persisted as a flat array of
/// records and re-keyed on load.
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    ratings: HashMap<String, MemoryRating>,
}

impl RatingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the keyed table from its on-disk array form
    pub fn from_records(records: Vec<MemoryRating>) -> Self {
        let ratings = records
            .into_iter()
            .map(|rating| (rating.key(), rating))
            .collect();
        Self { ratings }
    }

    /// Flatten the table into its on-disk array form
    pub fn to_records(&self) -> Vec<MemoryRating> {
        self.ratings.values().cloned().collect()
    }

    /// Look up the rating for a pair, if one has been learned
    pub fn get(&self, memory_id: &str, kernel_id: &str) -> Option<&MemoryRating> {
        self.ratings.get(&rating_key(memory_id, kernel_id))
    }

    /// Fetch the rating for a pair, initializing a fresh one if absent
    pub fn get_or_init(&mut self, memory_id: &str, kernel_id: &str) -> &mut MemoryRating {
        self.ratings
            .entry(rating_key(memory_id, kernel_id))
            .or_insert_with(|| MemoryRating::new(memory_id, kernel_id))
    }

    /// Insert or replace a rating under its own key
    pub fn insert(&mut self, rating: MemoryRating) {
        self.ratings.insert(rating.key(), rating);
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}
