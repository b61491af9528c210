//! The load, aggregate and report sequence behind each binary.
//!
//! Kept out of `main` so the whole pipeline can be driven from tests with a
//! fixed clock and a temporary output directory.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracelens_core::formatting::format_count;
use tracelens_core::Result;
use tracelens_data::digest::HarvestDigest;
use tracelens_data::harvest::{HarvestAggregates, HarvestAggregator};
use tracelens_data::reader::{load_harvest_log, load_trace, SkippedLine};
use tracelens_data::trace::{TraceAggregates, TraceAggregator};
use tracelens_report::{harvest_view, trace_view};
use tracing::{info, warn};

// ── Trace ─────────────────────────────────────────────────────────────────────

/// Load and aggregate a trace file.
pub fn analyze_trace(path: &Path) -> Result<TraceAggregates> {
    let trace = load_trace(path)?;
    info!("Analyzing {} events", trace.events.len());
    let agg = TraceAggregator::run(&trace);
    if agg.main_thread.is_none() {
        warn!("No CrRendererMain thread found; long tasks will not be reported");
    }
    Ok(agg)
}

/// Load, aggregate and render a trace file.
pub fn trace_report(path: &Path) -> Result<String> {
    analyze_trace(path).map(|agg| trace_view::render(&agg))
}

// ── Harvest ───────────────────────────────────────────────────────────────────

/// A loaded, aggregated and rendered harvest log.
#[derive(Debug)]
pub struct HarvestRun {
    pub aggregates: HarvestAggregates,
    pub report: String,
    pub skipped: Vec<SkippedLine>,
}

/// Load, aggregate and render a harvest log. Nothing is written.
pub fn harvest_run(path: &Path) -> Result<HarvestRun> {
    let log = load_harvest_log(path)?;
    if !log.skipped.is_empty() {
        warn!("{} malformed lines skipped", log.skipped.len());
    }

    let aggregates = HarvestAggregator::run(&log.entries);
    info!("Found {} harvest events", format_count(aggregates.harvest_events));

    let report = harvest_view::render(&aggregates);
    Ok(HarvestRun {
        aggregates,
        report,
        skipped: log.skipped,
    })
}

/// Write the digest of `aggregates` into `output_dir`, stamped with `at`.
/// Called after the report is printed; a failure here loses only the file.
pub fn write_digest(
    aggregates: &HarvestAggregates,
    output_dir: &Path,
    at: NaiveDateTime,
) -> Result<PathBuf> {
    HarvestDigest::from_snapshot(aggregates).write_to(output_dir, at)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
