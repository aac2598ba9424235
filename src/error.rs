//! Fatal error type for a sorting run.
//!
//! Only configuration and environment problems end up here. Per-document
//! failures (extraction, relocation) are recovered inside the dispatcher and
//! never reach this type.

use std::path::PathBuf;
use thiserror::Error;

use crate::taxonomy::TaxonomyError;

#[derive(Debug, Error)]
pub enum SortError {
    /// Taxonomy file missing or malformed
    #[error("configuration error: {0}")]
    Config(#[from] TaxonomyError),

    /// No extractor handles the requested document extension
    #[error("unsupported document extension: {0:?}")]
    UnsupportedExtension(String),

    /// Root folder missing or not a directory
    #[error("invalid root folder {}: {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    /// Destination layout could not be prepared
    #[error("failed to prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SortError>;
