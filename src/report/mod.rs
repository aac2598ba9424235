//! Distribution report.
//!
//! Built by re-scanning the destination tree after all dispatches have
//! finished; nothing is carried over from the workers. Read-only and safe to
//! run repeatedly.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

use crate::layout::has_extension;
use crate::taxonomy::{Taxonomy, OTHERS};

/// One category's share of the sorted documents
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
    /// Percentage of the grand total, 0 when there are no documents
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub total: usize,
    /// Taxonomy order, `Others` last
    pub categories: Vec<CategoryShare>,
}

impl Report {
    #[cfg(test)]
    pub(crate) fn get(&self, category: &str) -> Option<&CategoryShare> {
        self.categories.iter().find(|c| c.category == category)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Report:")?;
        writeln!(f, "----------------")?;
        for share in &self.categories {
            writeln!(f, "{}: {:.2}%", share.category, share.percentage)?;
        }
        Ok(())
    }
}

/// Count documents per category under `root`
pub fn generate_report(root: &Path, taxonomy: &Taxonomy, ext: &str) -> Report {
    let mut counts: Vec<(String, usize)> = taxonomy
        .categories()
        .iter()
        .map(|category| {
            let count = category
                .subcategories
                .iter()
                .map(|sub| count_documents(&root.join(&category.name).join(&sub.name), ext))
                .sum();
            (category.name.clone(), count)
        })
        .collect();

    counts.push((OTHERS.to_string(), count_documents(&root.join(OTHERS), ext)));

    let total: usize = counts.iter().map(|(_, c)| c).sum();

    let categories = counts
        .into_iter()
        .map(|(category, count)| CategoryShare {
            category,
            count,
            percentage: if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();

    Report { total, categories }
}

/// Files with the extension directly inside `dir`; a missing directory counts as zero
fn count_documents(dir: &Path, ext: &str) -> usize {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "[Report] Directory missing at report time, counting zero");
        return 0;
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_extension(e.path(), ext))
        .count()
}
