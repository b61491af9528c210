//! File loading for both analyzers.
//!
//! Traces are parsed as one document and any failure is fatal. Harvest logs
//! are parsed line by line; a bad line is logged, recorded and skipped.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracelens_core::formatting::format_count;
use tracelens_core::{AnalyzerError, Result};
use tracing::{debug, info, warn};

use crate::harvest::HarvestEntry;
use crate::trace::TraceFile;

// ── Public types ──────────────────────────────────────────────────────────────

/// A log line that could not be turned into an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line_number: usize,
    pub message: String,
}

/// The parsed contents of a harvest JSONL file.
#[derive(Debug, Clone, Default)]
pub struct HarvestLog {
    pub entries: Vec<HarvestEntry>,
    pub skipped: Vec<SkippedLine>,
}

// ── Trace ─────────────────────────────────────────────────────────────────────

/// Load a whole Chrome trace document.
pub fn load_trace(path: &Path) -> Result<TraceFile> {
    info!("Loading trace file: {}", path.display());

    let file = std::fs::File::open(path).map_err(|source| AnalyzerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let document: serde_json::Value = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|source| AnalyzerError::TraceParse {
            path: path.to_path_buf(),
            source,
        })?;

    let trace = TraceFile::from_value(&document);
    debug!("Trace {} holds {} events", path.display(), trace.events.len());
    Ok(trace)
}

// ── Harvest log ───────────────────────────────────────────────────────────────

/// Load a harvest JSONL file, skipping lines that do not parse.
///
/// Blank lines are ignored without a warning. Lines that are invalid JSON or
/// not a JSON object are reported through `warn!` and returned in
/// [`HarvestLog::skipped`]; they never abort the load.
pub fn load_harvest_log(path: &Path) -> Result<HarvestLog> {
    let file = std::fs::File::open(path).map_err(|source| AnalyzerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "Parsing {}...",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    );

    let log = parse_harvest_lines(std::io::BufReader::new(file))?;
    info!("Parsed {} total events", format_count(log.entries.len() as u64));
    Ok(log)
}

/// Parse harvest lines from any buffered reader.
pub fn parse_harvest_lines(reader: impl BufRead) -> Result<HarvestLog> {
    let mut log = HarvestLog::default();

    for (index, line_result) in reader.split(b'\n').enumerate() {
        let line_number = index + 1;
        let line = match String::from_utf8(line_result?) {
            Ok(l) => l,
            Err(e) => {
                warn!("Line {}: invalid UTF-8: {}", line_number, e);
                log.skipped.push(SkippedLine {
                    line_number,
                    message: e.to_string(),
                });
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let value: serde_json::Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                warn!("Line {}: JSON error: {}", line_number, e);
                log.skipped.push(SkippedLine {
                    line_number,
                    message: e.to_string(),
                });
                continue;
            }
        };

        match HarvestEntry::from_value(&value) {
            Some(entry) => log.entries.push(entry),
            None => {
                warn!("Line {}: expected a JSON object", line_number);
                log.skipped.push(SkippedLine {
                    line_number,
                    message: "expected a JSON object".to_string(),
                });
            }
        }
    }

    debug!(
        "{} entries parsed, {} lines skipped",
        log.entries.len(),
        log.skipped.len()
    );
    Ok(log)
}

/// Most recently modified `*.jsonl` file directly inside any of `dirs`.
///
/// Directories that do not exist are ignored. Returns `None` when no log
/// file is found.
pub fn find_latest_log(dirs: &[PathBuf]) -> Option<PathBuf> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;

    for dir in dirs.iter().filter(|d| d.is_dir()) {
        let candidates = walkdir::WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry
                        .path()
                        .extension()
                        .map(|ext| ext == "jsonl")
                        .unwrap_or(false)
            });

        for entry in candidates {
            let modified = match entry.metadata().ok().and_then(|m| m.modified().ok()) {
                Some(t) => t,
                None => continue,
            };
            if latest.as_ref().map_or(true, |(best, _)| modified > *best) {
                latest = Some((modified, entry.into_path()));
            }
        }
    }

    latest.map(|(_, path)| path)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
