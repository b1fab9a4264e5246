//! BM25+ scoring over a candidate corpus
//!
//! Document frequencies are built over the pre-filtered candidate set, not
//! the full memory store: the filter stage already picked the relevant
//! universe, so IDF rewards terms that are rare *within* it.

use std::collections::{HashMap, HashSet};

/// BM25 term-frequency saturation constant
pub const BM25_K1: f64 = 1.2;

/// BM25 length-normalization constant
pub const BM25_B: f64 = 0.75;

/// Guard against divide-by-zero in the tf normalization denominator
const DENOMINATOR_EPSILON: f64 = 1e-6;

/// Corpus statistics computed over a candidate document set.
#[derive(Debug, Clone)]
pub struct CorpusStats {
    /// Number of candidate documents containing each term
    pub doc_frequencies: HashMap<String, usize>,
    /// Number of candidate documents
    pub doc_count: usize,
    /// Average candidate document length in tokens
    pub avg_doc_len: f64,
}

impl CorpusStats {
    /// Build statistics from tokenized candidate documents.
    ///
    /// Each document contributes at most one count per term, regardless of
    /// how often the term repeats within it.
    pub fn from_documents(documents: &[Vec<String>]) -> Self {
        let mut doc_frequencies: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;

        for tokens in documents {
            total_len += tokens.len();
            let unique: HashSet<&String> = tokens.iter().collect();
            for term in unique {
                *doc_frequencies.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let avg_doc_len = if documents.is_empty() {
            0.0
        } else {
            total_len as f64 / documents.len() as f64
        };

        Self {
            doc_frequencies,
            doc_count: documents.len(),
            avg_doc_len,
        }
    }

    /// Document frequency of a term within the candidate set
    pub fn doc_frequency(&self, term: &str) -> usize {
        self.doc_frequencies.get(term).copied().unwrap_or(0)
    }
}

/// Score a document against a query with BM25+.
///
/// Uses the `+1` variant inside the IDF logarithm, which keeps IDF
/// non-negative for any document frequency. Returns 0.0 when either token
/// list is empty; never produces NaN or infinity.
pub fn bm25_score(query_tokens: &[String], doc_tokens: &[String], stats: &CorpusStats) -> f64 {
    if query_tokens.is_empty() || doc_tokens.is_empty() {
        return 0.0;
    }

    let mut term_frequencies: HashMap<&str, usize> = HashMap::new();
    for token in doc_tokens {
        *term_frequencies.entry(token.as_str()).or_insert(0) += 1;
    }

    let doc_len = doc_tokens.len() as f64;
    let avg_doc_len = stats.avg_doc_len.max(1.0);
    let n = stats.doc_count as f64;

    let unique_query_terms: HashSet<&str> = query_tokens.iter().map(String::as_str).collect();

    let mut score = 0.0;
    for term in unique_query_terms {
        let Some(&tf) = term_frequencies.get(term) else {
            continue;
        };
        let tf = tf as f64;
        let df = stats.doc_frequency(term) as f64;

        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
        let numerator = tf * (BM25_K1 + 1.0);
        let denominator = tf + BM25_K1 * (1.0 - BM25_B + BM25_B * doc_len / avg_doc_len);

        score += idf * numerator / denominator.max(DENOMINATOR_EPSILON);
    }

    score
}
