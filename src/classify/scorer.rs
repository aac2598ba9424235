//! Keyword scorer.
//!
//! A subcategory's score is the sum, over its keywords, of how many tokens
//! equal that keyword. Matching is exact against whole tokens; a keyword
//! containing whitespace can only match a token that contains the same
//! whitespace, which the normalizer never produces.

use std::collections::HashMap;

/// Token frequencies of one document, built once and reused for every
/// subcategory
#[derive(Debug, Clone, Default)]
pub struct TokenCounts<'a> {
    counts: HashMap<&'a str, u64>,
}

impl<'a> TokenCounts<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        let mut counts = HashMap::with_capacity(tokens.len());
        for token in tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Score a keyword list against these counts (case-insensitive)
    pub fn score<S: AsRef<str>>(&self, keywords: &[S]) -> u64 {
        keywords
            .iter()
            .map(|k| self.count(&k.as_ref().to_lowercase()))
            .sum()
    }
}

/// Score a token sequence against one keyword list
pub fn score<S: AsRef<str>>(tokens: &[String], keywords: &[S]) -> u64 {
    TokenCounts::new(tokens).score(keywords)
}
