use clap::Parser;
use std::path::PathBuf;

/// Trace file analysed when no path is given.
pub const DEFAULT_TRACE_FILE: &str = "Trace-20251219T154708.json";

/// Directory the harvest digest is written to by default.
pub const DEFAULT_OUTPUT_DIR: &str = "work";

// ── TraceSettings (CLI) ───────────────────────────────────────────────────────

/// Chrome DevTools performance trace analyzer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "analyze_trace",
    about = "Report long tasks, GC, layout, paint, memory and frame rate from a Chrome performance trace",
    version
)]
pub struct TraceSettings {
    /// Path to the trace JSON file
    #[arg(default_value = DEFAULT_TRACE_FILE)]
    pub path: PathBuf,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl TraceSettings {
    /// Log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        effective_log_level(&self.log_level, self.debug)
    }
}

// ── HarvestSettings (CLI) ─────────────────────────────────────────────────────

/// Harvest event log analyzer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "analyze_harvest_logs",
    about = "Flag miscategorized or anomalous resource detections in a harvest session log",
    version
)]
pub struct HarvestSettings {
    /// Path to the session JSONL file (latest log is used when omitted)
    pub path: Option<PathBuf>,

    /// Directory the JSON digest is written to
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl HarvestSettings {
    /// Log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        effective_log_level(&self.log_level, self.debug)
    }
}

// --debug overrides log level.
fn effective_log_level(level: &str, debug: bool) -> &str {
    if debug {
        "DEBUG"
    } else {
        level
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── TraceSettings ─────────────────────────────────────────────────────────

    #[test]
    fn test_trace_settings_default_path() {
        let settings = TraceSettings::parse_from(["analyze_trace"]);
        assert_eq!(settings.path, PathBuf::from(DEFAULT_TRACE_FILE));
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_trace_settings_positional_path() {
        let settings = TraceSettings::parse_from(["analyze_trace", "/tmp/profile.json"]);
        assert_eq!(settings.path, PathBuf::from("/tmp/profile.json"));
    }

    #[test]
    fn test_trace_settings_rejects_unknown_level() {
        let result = TraceSettings::try_parse_from(["analyze_trace", "--log-level", "LOUD"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_trace_settings_debug_overrides_level() {
        let settings = TraceSettings::parse_from(["analyze_trace", "--log-level", "ERROR", "--debug"]);
        assert_eq!(settings.effective_log_level(), "DEBUG");
    }

    // ── HarvestSettings ───────────────────────────────────────────────────────

    #[test]
    fn test_harvest_settings_defaults() {
        let settings = HarvestSettings::parse_from(["analyze_harvest_logs"]);
        assert!(settings.path.is_none());
        assert_eq!(settings.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(settings.effective_log_level(), "INFO");
    }

    #[test]
    fn test_harvest_settings_explicit_values() {
        let settings = HarvestSettings::parse_from([
            "analyze_harvest_logs",
            "logs/sessions/session.jsonl",
            "--output-dir",
            "/tmp/out",
            "--log-level",
            "WARNING",
        ]);
        assert_eq!(
            settings.path,
            Some(PathBuf::from("logs/sessions/session.jsonl"))
        );
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(settings.effective_log_level(), "WARNING");
    }

    #[test]
    fn test_harvest_settings_rejects_extra_positional() {
        let result = HarvestSettings::try_parse_from(["analyze_harvest_logs", "a.jsonl", "b.jsonl"]);
        assert!(result.is_err());
    }
}
