//! Command line and run settings.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::execution::ConflictPolicy;

/// Environment variable naming the taxonomy file
pub const CONFIG_ENV: &str = "DOCSORT_CONFIG";

/// Default taxonomy file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default per-document extraction timeout
pub const DEFAULT_EXTRACT_TIMEOUT_SECS: u64 = 60;

#[derive(Parser, Debug, Clone)]
#[command(name = "docsort")]
#[command(about = "Sort a folder of documents into a keyword taxonomy")]
pub struct Cli {
    /// Root folder containing the documents to sort
    #[arg(long)]
    pub root: PathBuf,

    /// Print a distribution report after sorting
    #[arg(long)]
    pub report: bool,

    /// Print the report as JSON instead of text
    #[arg(long, requires = "report")]
    pub json: bool,

    /// Taxonomy file (category -> subcategory -> keywords)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Document extension to sort, without the dot
    #[arg(long, default_value = "pdf")]
    pub extension: String,

    /// Number of concurrent workers (defaults to CPU count)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Per-document extraction timeout in seconds, 0 disables
    #[arg(long, default_value_t = DEFAULT_EXTRACT_TIMEOUT_SECS)]
    pub extract_timeout_secs: u64,

    /// What to do when a file with the same name already exists at the destination
    #[arg(long, value_enum, default_value_t = ConflictPolicy::AutoRename)]
    pub on_conflict: ConflictPolicy,

    /// Log per-subcategory scores
    #[arg(short, long)]
    pub verbose: bool,
}

/// Resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub taxonomy_path: PathBuf,
    pub extension: String,
    pub workers: usize,
    pub extract_timeout: Option<Duration>,
    pub conflict_policy: ConflictPolicy,
    pub report: bool,
    pub json: bool,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        let extension = cli.extension.trim_start_matches('.').to_lowercase();

        Self {
            root: cli.root.clone(),
            taxonomy_path: resolve_taxonomy_path(
                cli.config.as_deref(),
                std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            ),
            extension,
            workers: cli.workers.unwrap_or_else(num_cpus::get).max(1),
            extract_timeout: (cli.extract_timeout_secs > 0)
                .then(|| Duration::from_secs(cli.extract_timeout_secs)),
            conflict_policy: cli.on_conflict,
            report: cli.report,
            json: cli.json,
        }
    }
}

/// Pick the taxonomy file: explicit flag, then environment, then
/// `./config.json`, then the platform config directory.
///
/// Always returns a path; whether it exists is checked when loading.
pub fn resolve_taxonomy_path(explicit: Option<&Path>, from_env: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = from_env.filter(|p| !p.as_os_str().is_empty()) {
        return path;
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return local;
    }

    dirs::config_dir()
        .map(|dir| dir.join("docsort").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
        .unwrap_or(local)
}
