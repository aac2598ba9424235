//! Worker Pool
//!
//! One tokio task per document, with concurrency bounded by a semaphore
//! sized to the host's CPU count. Tasks share nothing mutable: the
//! dispatcher and everything it holds are read-only behind `Arc`. Results
//! are collected in completion order.

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::dispatcher::{DispatchOutcome, DispatchStatus, Dispatcher};

/// Cancellation flag checked before each queued document starts
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    /// Set the flag, returning whether it was already set
    pub fn abort(&self) -> bool {
        self.0.swap(true, Ordering::SeqCst)
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Advisory counters for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    /// Moved into a category/subcategory folder
    pub assigned: usize,
    /// Moved into `Others` (no keyword match or extraction failure)
    pub unclassified: usize,
    pub extraction_failures: usize,
    pub renamed: usize,
    pub skipped: usize,
    pub relocation_failures: usize,
    pub cancelled: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[DispatchOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Default::default()
        };

        for outcome in outcomes {
            if outcome.extraction_error.is_some() {
                summary.extraction_failures += 1;
            }

            match &outcome.status {
                DispatchStatus::Moved(_) | DispatchStatus::MovedWithRename(_) => {
                    if outcome.classification.is_assigned() {
                        summary.assigned += 1;
                    } else {
                        summary.unclassified += 1;
                    }
                    if matches!(outcome.status, DispatchStatus::MovedWithRename(_)) {
                        summary.renamed += 1;
                    }
                }
                DispatchStatus::Skipped(_) => summary.skipped += 1,
                DispatchStatus::Failed(_) => summary.relocation_failures += 1,
                DispatchStatus::Cancelled => summary.cancelled += 1,
            }
        }

        summary
    }

    /// Documents that reached a destination folder
    pub fn moved(&self) -> usize {
        self.assigned + self.unclassified
    }
}

#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Pool with at least one worker
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Dispatch every document, returning outcomes in completion order
    pub async fn run(
        &self,
        dispatcher: Arc<Dispatcher>,
        documents: Vec<PathBuf>,
        abort: &AbortFlag,
    ) -> Vec<DispatchOutcome> {
        let total = documents.len();
        if total == 0 {
            tracing::info!("[WorkerPool] No documents to sort");
            return Vec::new();
        }

        tracing::info!(documents = total, workers = self.workers, "[WorkerPool] Starting worker pool");

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut futures = FuturesUnordered::new();

        for path in documents {
            let sem = Arc::clone(&semaphore);
            let dispatcher = Arc::clone(&dispatcher);
            let abort = abort.clone();
            let task_path = path.clone();

            let handle = tokio::spawn(async move {
                // Semaphore is never closed while tasks are pending
                let _permit = match sem.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return DispatchOutcome::cancelled(task_path),
                };

                if abort.is_aborted() {
                    return DispatchOutcome::cancelled(task_path);
                }

                dispatcher.dispatch(task_path).await
            });

            futures.push(async move { (path, handle.await) });
        }

        let mut outcomes = Vec::with_capacity(total);

        while let Some((path, joined)) = futures.next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    tracing::error!(
                        file = %path.display(),
                        error = %join_err,
                        "[WorkerPool] Worker task panicked"
                    );
                    DispatchOutcome::failed(path, format!("Worker task failed: {}", join_err))
                }
            };
            outcomes.push(outcome);

            tracing::info!("[WorkerPool] Progress: {}/{} documents", outcomes.len(), total);
        }

        outcomes
    }
}
