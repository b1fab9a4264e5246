//! Lexical text processing
//!
//! Tokenization, shingling, and BM25 scoring. Every stage of the selection
//! pipeline (document statistics, query scoring, similarity judgements)
//! goes through this one tokenizer so their views of a text agree.

pub mod bm25;
pub mod tokenizer;

pub use bm25::{CorpusStats, bm25_score};
pub use tokenizer::{jaccard_similarity, shingle_jaccard, shingles, tokenize};
