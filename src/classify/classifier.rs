//! Taxonomy-wide classification.
//!
//! The score table is an ordered list in taxonomy enumeration order. The
//! winner is the first entry holding the strictly greatest score, so ties go
//! to the pair declared first.

use std::path::PathBuf;

use super::scorer::TokenCounts;
use crate::taxonomy::{Taxonomy, OTHERS};

/// Outcome of classifying one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Assigned {
        category: String,
        subcategory: String,
    },
    /// No subcategory scored above zero, or the text could not be extracted
    Unclassified,
}

impl Classification {
    /// Category label reported for this outcome
    pub fn label(&self) -> &str {
        match self {
            Classification::Assigned { category, .. } => category,
            Classification::Unclassified => OTHERS,
        }
    }

    /// Destination folder relative to the sort root
    pub fn relative_dir(&self) -> PathBuf {
        match self {
            Classification::Assigned {
                category,
                subcategory,
            } => PathBuf::from(category).join(subcategory),
            Classification::Unclassified => PathBuf::from(OTHERS),
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Classification::Assigned { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEntry<'a> {
    pub category: &'a str,
    pub subcategory: &'a str,
    pub score: u64,
}

/// Per-document scores keyed by (category, subcategory), in taxonomy order
#[derive(Debug, Clone, Default)]
pub struct ScoreTable<'a> {
    entries: Vec<ScoreEntry<'a>>,
}

impl<'a> ScoreTable<'a> {
    /// Score every (category, subcategory) pair of the taxonomy
    pub fn build(tokens: &[String], taxonomy: &'a Taxonomy) -> Self {
        let counts = TokenCounts::new(tokens);
        let entries = taxonomy
            .pairs()
            .map(|(category, sub)| ScoreEntry {
                category: &category.name,
                subcategory: &sub.name,
                score: counts.score(&sub.keywords),
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[ScoreEntry<'a>] {
        &self.entries
    }

    /// First entry with the strictly greatest nonzero score
    pub fn best(&self) -> Option<&ScoreEntry<'a>> {
        let mut best: Option<&ScoreEntry<'a>> = None;
        for entry in &self.entries {
            if entry.score > best.map_or(0, |b| b.score) {
                best = Some(entry);
            }
        }
        best
    }

    pub fn classification(&self) -> Classification {
        match self.best() {
            Some(entry) => Classification::Assigned {
                category: entry.category.to_string(),
                subcategory: entry.subcategory.to_string(),
            },
            None => Classification::Unclassified,
        }
    }
}

/// Classify a token sequence against the full taxonomy
pub fn classify(tokens: &[String], taxonomy: &Taxonomy) -> Classification {
    ScoreTable::build(tokens, taxonomy).classification()
}
