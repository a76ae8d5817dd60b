//! Local BM25 query encoder.
//!
//! Produces the same query-side sparse vectors as the `Qdrant/bm25` model used
//! to index the collection: lowercase word tokens, English stopwords removed,
//! Snowball-stemmed, each distinct stem hashed with murmur3 (seed 0) and the
//! absolute value of the signed hash used as the vector index. Query weights
//! are all 1.0; the document-side BM25 weighting is done at index time and
//! Qdrant applies IDF.

use std::collections::BTreeSet;

use rust_stemmers::{Algorithm, Stemmer};
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::error::{Result, TicketLensError};
use crate::vector::SparseVector;

const TOKEN_MAX_LENGTH: usize = 40;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "aren't", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "couldn", "couldn't", "d", "did", "didn", "didn't",
    "do", "does", "doesn", "doesn't", "doing", "don", "don't", "down", "during", "each", "few",
    "for", "from", "further", "had", "hadn", "hadn't", "has", "hasn", "hasn't", "have", "haven",
    "haven't", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
    "i", "if", "in", "into", "is", "isn", "isn't", "it", "it's", "its", "itself", "just", "ll",
    "m", "ma", "me", "mightn", "mightn't", "more", "most", "mustn", "mustn't", "my", "myself",
    "needn", "needn't", "no", "nor", "not", "now", "o", "of", "off", "on", "once", "only", "or",
    "other", "our", "ours", "ourselves", "out", "over", "own", "re", "s", "same", "shan",
    "shan't", "she", "she's", "should", "should've", "shouldn", "shouldn't", "so", "some",
    "such", "t", "than", "that", "that'll", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "ve", "very", "was", "wasn", "wasn't", "we", "were", "weren", "weren't", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "won", "won't",
    "wouldn", "wouldn't", "y", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Bm25Encoder;

impl Bm25Encoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a query. Empty and all-stopword queries yield an empty vector.
    pub fn encode_query(&self, text: &str) -> Result<SparseVector> {
        let stemmer = Stemmer::create(Algorithm::English);

        let mut indices = BTreeSet::new();
        for token in tokenize(text) {
            if token.chars().count() > TOKEN_MAX_LENGTH || STOPWORDS.contains(&token.as_str()) {
                continue;
            }
            let stem = stemmer.stem(&token);
            if !stem.is_empty() {
                indices.insert(token_index(&stem)?);
            }
        }

        let values = vec![1.0; indices.len()];
        Ok(SparseVector {
            indices: indices.into_iter().collect(),
            values,
        })
    }
}

/// Lowercased runs of word characters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !is_word_char(c))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

/// Letters, numbers and `_`. Combining marks (harakat, vowel signs) are
/// separators, as in the tokenizer the collection was indexed with.
fn is_word_char(c: char) -> bool {
    use GeneralCategory::*;

    c == '_'
        || matches!(
            get_general_category(c),
            UppercaseLetter
                | LowercaseLetter
                | TitlecaseLetter
                | ModifierLetter
                | OtherLetter
                | DecimalNumber
                | LetterNumber
                | OtherNumber
        )
}

/// murmur3 x86_32 (seed 0) read as a signed integer, absolute value.
fn token_index(token: &str) -> Result<u32> {
    let hash = murmur3::murmur3_32(&mut token.as_bytes(), 0)
        .map_err(|e| TicketLensError::Embedding(format!("Failed to hash token: {e}")))?;
    Ok((hash as i32).unsigned_abs())
}
