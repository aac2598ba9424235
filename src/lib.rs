pub mod classify;
pub mod config;
pub mod error;
pub mod execution;
pub mod extract;
pub mod layout;
pub mod normalize;
pub mod report;
pub mod taxonomy;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use config::{Cli, Settings};
use error::{Result, SortError};
use execution::{AbortFlag, Dispatcher, RunSummary, WorkerPool};
use extract::{DocumentExtractor, Extractor};
use normalize::Normalizer;
use taxonomy::Taxonomy;
use tracing_subscriber::EnvFilter;

/// Exit code for a run stopped by Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

/// Stop queued documents on the first Ctrl-C, exit at once on the second
async fn watch_interrupts(abort: AbortFlag) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if abort.abort() {
            tracing::warn!("[Docsort] Second interrupt, exiting without waiting");
            std::process::exit(i32::from(EXIT_INTERRUPTED));
        }
        tracing::warn!(
            "[Docsort] Interrupt received, finishing documents already in progress (Ctrl-C again to force quit)"
        );
    }
}

pub fn run() -> ExitCode {
    // Load .env file if present (RUST_LOG, DOCSORT_CONFIG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing with RUST_LOG env filter
    // Default: warn for most crates, info for ours (run summary visible)
    // --verbose adds per-subcategory scores
    let default_filter = if cli.verbose {
        "warn,docsort_lib=debug"
    } else {
        "warn,docsort_lib=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match run_cli(&cli) {
        Ok(summary) if summary.cancelled > 0 => ExitCode::from(EXIT_INTERRUPTED),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "[Docsort] Aborting");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load configuration, sort the root folder and print the report if asked
pub fn run_cli(cli: &Cli) -> Result<RunSummary> {
    let settings = Settings::from_cli(cli);
    if !DocumentExtractor::is_supported(&settings.extension) {
        return Err(SortError::UnsupportedExtension(settings.extension));
    }
    let taxonomy = Arc::new(Taxonomy::load(&settings.taxonomy_path)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(SortError::Runtime)?;

    let abort = AbortFlag::default();
    let extractor: Arc<dyn Extractor> = Arc::new(DocumentExtractor::new());

    let result = runtime.block_on(async {
        tokio::spawn(watch_interrupts(abort.clone()));

        sort_folder(&settings, Arc::clone(&taxonomy), extractor, &abort).await
    });

    // Timed-out extractions may still hold blocking threads
    runtime.shutdown_timeout(Duration::from_secs(1));

    let summary = result?;

    if settings.report {
        let report = report::generate_report(&settings.root, &taxonomy, &settings.extension);
        if settings.json {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!(error = %e, "[Report] Failed to serialize report"),
            }
        } else {
            print!("{}", report);
        }
    }

    Ok(summary)
}

/// Prepare the layout under `settings.root` and dispatch every document in it
pub async fn sort_folder(
    settings: &Settings,
    taxonomy: Arc<Taxonomy>,
    extractor: Arc<dyn Extractor>,
    abort: &AbortFlag,
) -> Result<RunSummary> {
    layout::validate_root(&settings.root)?;
    layout::create_directories(&settings.root, &taxonomy)?;

    let documents = layout::discover_documents(&settings.root, &settings.extension)?;
    tracing::info!(
        root = %settings.root.display(),
        documents = documents.len(),
        extension = %settings.extension,
        "[Docsort] Discovered documents"
    );

    // Built once, before any worker starts
    let normalizer = Arc::new(Normalizer::english());

    let dispatcher = Dispatcher::new(settings.root.clone(), taxonomy, normalizer, extractor)
        .with_extract_timeout(settings.extract_timeout)
        .with_conflict_policy(settings.conflict_policy);

    let outcomes = WorkerPool::new(settings.workers)
        .run(Arc::new(dispatcher), documents, abort)
        .await;

    let summary = RunSummary::from_outcomes(&outcomes);

    tracing::info!(
        total = summary.total,
        moved = summary.moved(),
        assigned = summary.assigned,
        unclassified = summary.unclassified,
        extraction_failures = summary.extraction_failures,
        relocation_failures = summary.relocation_failures,
        "[Docsort] Sorting complete"
    );
    if summary.cancelled > 0 {
        tracing::warn!(
            cancelled = summary.cancelled,
            "[Docsort] Run interrupted; remaining documents were left in place"
        );
    }

    Ok(summary)
}
