//! Taxonomy Module
//!
//! In-memory category -> subcategory -> keyword configuration. Enumeration
//! order is the order of the source document and is observable: the
//! classifier breaks ties on it, the reporter prints in it.

mod loader;

use thiserror::Error;

/// Name of the fallback folder for unclassified documents
pub const OTHERS: &str = "Others";

/// Error type for taxonomy loading and validation
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("taxonomy file not found: {0}")]
    NotFound(String),

    #[error("failed to read taxonomy file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse taxonomy: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid taxonomy: {0}")]
    Invalid(String),
}

/// A leaf of the taxonomy with its keywords (lowercased, deduplicated)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcategory {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub subcategories: Vec<Subcategory>,
}

/// Immutable, ordered taxonomy shared read-only by all workers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    categories: Vec<Category>,
}

impl Subcategory {
    /// Create a subcategory, normalizing keywords to lowercase.
    ///
    /// Duplicate keywords are dropped so each distinct keyword is counted once.
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if keyword.is_empty() || normalized.contains(&keyword) {
                continue;
            }
            normalized.push(keyword);
        }

        Self {
            name: name.into(),
            keywords: normalized,
        }
    }
}

impl Taxonomy {
    /// Build a taxonomy, rejecting names that would collide on disk
    pub fn new(categories: Vec<Category>) -> Result<Self, TaxonomyError> {
        for (idx, category) in categories.iter().enumerate() {
            validate_name(&category.name)?;

            if category.name.eq_ignore_ascii_case(OTHERS) {
                return Err(TaxonomyError::Invalid(format!(
                    "category name '{}' is reserved for unclassified documents",
                    category.name
                )));
            }

            if categories[..idx].iter().any(|c| c.name == category.name) {
                return Err(TaxonomyError::Invalid(format!(
                    "duplicate category '{}'",
                    category.name
                )));
            }

            if category.subcategories.is_empty() {
                tracing::warn!(
                    category = %category.name,
                    "[Taxonomy] Category has no subcategories; nothing can be assigned to it"
                );
            }

            for (sub_idx, sub) in category.subcategories.iter().enumerate() {
                validate_name(&sub.name)?;

                if category.subcategories[..sub_idx]
                    .iter()
                    .any(|s| s.name == sub.name)
                {
                    return Err(TaxonomyError::Invalid(format!(
                        "duplicate subcategory '{}/{}'",
                        category.name, sub.name
                    )));
                }

                for keyword in &sub.keywords {
                    if keyword.split_whitespace().nth(1).is_some() {
                        // Tokens never contain whitespace, so phrases score zero
                        tracing::warn!(
                            category = %category.name,
                            subcategory = %sub.name,
                            keyword = %keyword,
                            "[Taxonomy] Multi-word keyword will never match a single token"
                        );
                    }
                }
            }
        }

        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Iterate (category, subcategory) pairs in enumeration order
    pub fn pairs(&self) -> impl Iterator<Item = (&Category, &Subcategory)> {
        self.categories
            .iter()
            .flat_map(|c| c.subcategories.iter().map(move |s| (c, s)))
    }

    pub fn pair_count(&self) -> usize {
        self.categories.iter().map(|c| c.subcategories.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pair_count() == 0
    }
}

/// Names become directory components, so they must be a single plain segment
fn validate_name(name: &str) -> Result<(), TaxonomyError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TaxonomyError::Invalid("empty category or subcategory name".to_string()));
    }
    if trimmed == "." || trimmed == ".." || name.contains('/') || name.contains('\\') {
        return Err(TaxonomyError::Invalid(format!(
            "'{}' is not usable as a folder name",
            name
        )));
    }
    Ok(())
}
