use std::path::{Path, PathBuf};

use tracelens_core::thresholds::HARVEST_LOG_DIRS;
use tracelens_data::reader::find_latest_log;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name (`DEBUG`, `INFO`, `WARNING`, `ERROR`) to an
/// [`EnvFilter`] directive. Unknown names are passed through lowercased.
pub fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Falls back to `info` when the directive does not parse.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    Ok(())
}

// ── Log discovery ──────────────────────────────────────────────────────────────

/// The conventional session log directories under `base`, in search order.
pub fn log_dirs(base: &Path) -> Vec<PathBuf> {
    HARVEST_LOG_DIRS.iter().map(|d| base.join(d)).collect()
}

/// Most recent session log under `base`, if any.
pub fn discover_log(base: &Path) -> Option<PathBuf> {
    find_latest_log(&log_dirs(base))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
