//! JSON taxonomy source.
//!
//! Expected shape: `{ "Category": { "Subcategory": ["keyword", ...] } }`.
//! serde_json is built with `preserve_order`, so object iteration follows
//! the document.

use serde_json::Value;
use std::fs;
use std::path::Path;

use super::{Category, Subcategory, Taxonomy, TaxonomyError};

impl Taxonomy {
    /// Load and validate a taxonomy file
    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        if !path.is_file() {
            return Err(TaxonomyError::NotFound(path.display().to_string()));
        }

        let json = fs::read_to_string(path).map_err(|source| TaxonomyError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let taxonomy = Self::from_json_str(&json)?;

        tracing::info!(
            path = %path.display(),
            categories = taxonomy.categories().len(),
            subcategories = taxonomy.pair_count(),
            "[Taxonomy] Loaded taxonomy"
        );

        Ok(taxonomy)
    }

    /// Parse a taxonomy from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        let root: Value = serde_json::from_str(json)?;

        let root = root
            .as_object()
            .ok_or_else(|| TaxonomyError::Invalid("top level must be an object".to_string()))?;

        let mut categories = Vec::with_capacity(root.len());

        for (category_name, subcats) in root {
            let subcats = subcats.as_object().ok_or_else(|| {
                TaxonomyError::Invalid(format!(
                    "category '{}' must map subcategory names to keyword lists",
                    category_name
                ))
            })?;

            let mut subcategories = Vec::with_capacity(subcats.len());

            for (sub_name, keywords) in subcats {
                let keywords = keywords.as_array().ok_or_else(|| {
                    TaxonomyError::Invalid(format!(
                        "'{}/{}' must be a list of keywords",
                        category_name, sub_name
                    ))
                })?;

                let keywords = keywords
                    .iter()
                    .map(|k| {
                        k.as_str().ok_or_else(|| {
                            TaxonomyError::Invalid(format!(
                                "'{}/{}' contains a non-string keyword: {}",
                                category_name, sub_name, k
                            ))
                        })
                    })
                    .collect::<Result<Vec<&str>, _>>()?;

                subcategories.push(Subcategory::new(sub_name.clone(), keywords));
            }

            categories.push(Category {
                name: category_name.clone(),
                subcategories,
            });
        }

        Self::new(categories)
    }
}
