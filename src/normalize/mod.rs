//! Text Normalizer
//!
//! Turns extracted document text into the token sequence the scorer sees:
//! lowercased, punctuation stripped, English stop words removed. Only tokens
//! made entirely of alphanumeric characters survive, so hyphenated words and
//! anything with embedded punctuation are dropped rather than split.
//!
//! The stop-word set is built once, before any worker starts, and shared
//! read-only afterwards.

mod stopwords;

pub use stopwords::ENGLISH_STOPWORDS;

use std::collections::HashSet;

/// Clitic suffixes split off a word before filtering (`python's` -> `python`)
const CLITICS: &[&str] = &["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Normalized, ordered tokens of one document
pub type TokenSequence = Vec<String>;

#[derive(Debug, Clone)]
pub struct Normalizer {
    stopwords: HashSet<String>,
}

impl Normalizer {
    /// Normalizer with the built-in English stop-word list
    pub fn english() -> Self {
        let normalizer = Self::with_stopwords(ENGLISH_STOPWORDS.iter().copied());
        tracing::debug!(
            stopwords = normalizer.stopwords.len(),
            "[Normalizer] Initialized"
        );
        normalizer
    }

    pub fn with_stopwords<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Normalize text into tokens, preserving document order
    pub fn normalize(&self, text: &str) -> TokenSequence {
        let lowered = text.to_lowercase().replace('\u{2019}', "'");

        lowered
            .split_whitespace()
            .filter_map(|raw| {
                let word = raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
                let word = strip_clitic(word.trim_matches('\''));

                let keep = !word.is_empty()
                    && word.chars().all(char::is_alphanumeric)
                    && !self.is_stopword(word);

                keep.then(|| word.to_string())
            })
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::english()
    }
}

fn strip_clitic(word: &str) -> &str {
    CLITICS
        .iter()
        .find_map(|suffix| word.strip_suffix(suffix))
        .unwrap_or(word)
}
