//! Content tokenization and shingle similarity
//!
//! Normalizes free text into a bag of content tokens: lowercased,
//! punctuation stripped, stop words and single-character tokens dropped.
//! Token order is preserved so n-gram shingles can be built on top.

use std::collections::HashSet;

/// Shingle size used for content similarity
pub const SHINGLE_SIZE: usize = 3;

/// Stop words excluded from tokenization
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "of", "to", "in", "on", "for", "with", "is", "it", "as",
    "at", "by", "be", "are", "was", "were", "this", "that", "from", "we", "you", "they", "i", "me",
    "my", "your",
];

/// Tokenize text into an ordered sequence of content tokens.
///
/// Lowercases, replaces ASCII punctuation with spaces, splits on whitespace,
/// and drops empty strings, tokens shorter than two characters, and stop
/// words. Deterministic and total: any input produces a (possibly empty)
/// token list.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .filter(|token| token.chars().count() >= 2 && !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Build the set of n-gram shingles over a token sequence.
///
/// Sliding window of `n` tokens joined by single spaces. Returns the empty
/// set when fewer than `n` tokens are available.
pub fn shingles(tokens: &[String], n: usize) -> HashSet<String> {
    if n == 0 || tokens.len() < n {
        return HashSet::new();
    }
    tokens.windows(n).map(|window| window.join(" ")).collect()
}

/// Jaccard similarity of two pre-built shingle sets.
///
/// Returns 0.0 when the union is empty.
pub fn shingle_jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Jaccard similarity of two texts over their 3-shingle sets.
pub fn jaccard_similarity(text_a: &str, text_b: &str) -> f64 {
    let shingles_a = shingles(&tokenize(text_a), SHINGLE_SIZE);
    let shingles_b = shingles(&tokenize(text_b), SHINGLE_SIZE);
    shingle_jaccard(&shingles_a, &shingles_b)
}
