//! Per-document pipeline: extract -> normalize -> classify -> relocate.
//!
//! A dispatch never fails as a whole. Extraction problems route the document
//! to `Others`; relocation problems are reported in the outcome and logged.
//! Either way the caller moves on to the next document.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::relocate::{relocate, ConflictPolicy, RelocationOutcome};
use crate::classify::{Classification, ScoreTable};
use crate::extract::{panic_message, ExtractionError, Extractor};
use crate::normalize::Normalizer;
use crate::taxonomy::Taxonomy;

/// What happened to the file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    Moved(PathBuf),
    MovedWithRename(PathBuf),
    /// Destination taken and conflict policy is skip; file left in place
    Skipped(PathBuf),
    /// Relocation failed; file left in place
    Failed(String),
    /// Run was interrupted before this document started
    Cancelled,
}

/// Advisory result of one dispatch
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub source: PathBuf,
    pub classification: Classification,
    /// Set when extraction failed and the document was routed to `Others`
    pub extraction_error: Option<String>,
    pub status: DispatchStatus,
}

impl DispatchOutcome {
    pub(crate) fn cancelled(source: PathBuf) -> Self {
        Self {
            source,
            classification: Classification::Unclassified,
            extraction_error: None,
            status: DispatchStatus::Cancelled,
        }
    }

    pub(crate) fn failed(source: PathBuf, reason: String) -> Self {
        Self {
            source,
            classification: Classification::Unclassified,
            extraction_error: None,
            status: DispatchStatus::Failed(reason),
        }
    }

    /// Category label (`Others` for unclassified documents)
    pub fn label(&self) -> &str {
        self.classification.label()
    }

    /// Where the document ended up, if it was moved
    pub fn destination(&self) -> Option<&Path> {
        match &self.status {
            DispatchStatus::Moved(p) | DispatchStatus::MovedWithRename(p) => Some(p),
            _ => None,
        }
    }
}

/// Runs the per-document pipeline against a shared, read-only context
pub struct Dispatcher {
    root: PathBuf,
    taxonomy: Arc<Taxonomy>,
    normalizer: Arc<Normalizer>,
    extractor: Arc<dyn Extractor>,
    extract_timeout: Option<Duration>,
    conflict_policy: ConflictPolicy,
}

impl Dispatcher {
    pub fn new(
        root: PathBuf,
        taxonomy: Arc<Taxonomy>,
        normalizer: Arc<Normalizer>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        Self {
            root,
            taxonomy,
            normalizer,
            extractor,
            extract_timeout: None,
            conflict_policy: ConflictPolicy::default(),
        }
    }

    /// Bound each extractor call; `None` waits indefinitely
    pub fn with_extract_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.extract_timeout = timeout;
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Classify and relocate one document
    pub async fn dispatch(&self, path: PathBuf) -> DispatchOutcome {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let (classification, extraction_error) = match self.extract_text(&path).await {
            Ok(text) => (self.classify_text(&file_name, &text), None),
            Err(e) => {
                tracing::warn!(
                    file = %file_name,
                    error = %e,
                    "[Dispatcher] Error processing document, routing to Others"
                );
                (Classification::Unclassified, Some(e.to_string()))
            }
        };

        let dest_dir = self.root.join(classification.relative_dir());
        let policy = self.conflict_policy;
        let source = path.clone();

        let relocation =
            tokio::task::spawn_blocking(move || relocate(&source, &dest_dir, policy)).await;

        let status = match relocation {
            Ok(Ok(RelocationOutcome::Moved(dest))) => DispatchStatus::Moved(dest),
            Ok(Ok(RelocationOutcome::MovedWithRename(dest))) => {
                tracing::info!(
                    file = %file_name,
                    destination = %dest.display(),
                    "[Dispatcher] Destination name taken, moved under a new name"
                );
                DispatchStatus::MovedWithRename(dest)
            }
            Ok(Ok(RelocationOutcome::Skipped(existing))) => {
                tracing::warn!(
                    file = %file_name,
                    existing = %existing.display(),
                    "[Dispatcher] Destination exists, document left in place"
                );
                DispatchStatus::Skipped(existing)
            }
            Ok(Err(e)) => {
                tracing::error!(file = %file_name, error = %e, "[Dispatcher] Failed to relocate document");
                DispatchStatus::Failed(e.to_string())
            }
            Err(join_err) => {
                tracing::error!(file = %file_name, error = %join_err, "[Dispatcher] Relocation task failed");
                DispatchStatus::Failed(format!("Task failed: {}", join_err))
            }
        };

        let outcome = DispatchOutcome {
            source: path,
            classification,
            extraction_error,
            status,
        };

        tracing::debug!(
            file = %file_name,
            category = %outcome.label(),
            destination = ?outcome.destination(),
            "[Dispatcher] Dispatched"
        );

        outcome
    }

    /// Run the extractor on a blocking thread, bounded by the timeout
    async fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        let extractor = Arc::clone(&self.extractor);
        let owned = path.to_path_buf();
        let task = tokio::task::spawn_blocking(move || extractor.extract(&owned));

        let joined = match self.extract_timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                // The blocking thread finishes on its own; its result is dropped
                Err(_) => return Err(ExtractionError::TimedOut(limit)),
            },
            None => task.await,
        };

        match joined {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => Err(ExtractionError::Panicked(
                panic_message(&*join_err.into_panic()),
            )),
            Err(join_err) => Err(ExtractionError::Panicked(join_err.to_string())),
        }
    }

    fn classify_text(&self, file_name: &str, text: &str) -> Classification {
        let tokens = self.normalizer.normalize(text);
        let table = ScoreTable::build(&tokens, &self.taxonomy);

        for entry in table.entries() {
            tracing::debug!(
                file = %file_name,
                category = %entry.category,
                subcategory = %entry.subcategory,
                score = entry.score,
                "[Dispatcher] Score"
            );
        }

        table.classification()
    }
}
