//! Chrome DevTools performance trace records and analysis.
//!
//! A trace is one JSON document with a `traceEvents` array and a free-form
//! `metadata` object. Events are converted to [`TraceEvent`] once, at load
//! time, and never mutated afterwards.

pub mod aggregator;
pub mod issues;
pub mod stats;

use serde_json::{Map, Value};
use tracelens_core::thresholds::{RENDERER_MAIN_THREAD, THREAD_NAME_EVENT};
use tracing::debug;

use crate::fields::{f64_field, i64_field, str_field};

pub use aggregator::{TimedEvent, TraceAggregates, TraceAggregator};
pub use issues::{summarize_issues, Issue, Severity};

// ── TraceEvent ────────────────────────────────────────────────────────────────

/// One timestamped record from `traceEvents`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceEvent {
    pub name: String,
    /// The `cat` field, a comma-separated category list.
    pub category: String,
    /// The `ph` field.
    pub phase: String,
    /// Microseconds.
    pub timestamp: f64,
    /// Microseconds; `0.0` for instant and counter events.
    pub duration: f64,
    pub process_id: Option<i64>,
    pub thread_id: Option<i64>,
    pub args: Value,
}

impl TraceEvent {
    /// Build an event from a raw JSON object. Missing or wrongly typed fields
    /// fall back to neutral defaults.
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: str_field(value, "name"),
            category: str_field(value, "cat"),
            phase: str_field(value, "ph"),
            timestamp: f64_field(value, "ts"),
            duration: f64_field(value, "dur"),
            process_id: i64_field(value, "pid"),
            thread_id: i64_field(value, "tid"),
            args: value.get("args").cloned().unwrap_or(Value::Null),
        }
    }

    /// The nested `args.data` object, when present.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.args.get("data").and_then(Value::as_object)
    }

    /// A string under `args.data`, or `""`.
    pub fn data_str(&self, key: &str) -> &str {
        self.data()
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Whether this event ran on `thread`.
    pub fn is_on(&self, thread: Option<MainThread>) -> bool {
        match thread {
            Some(t) => self.process_id == Some(t.process_id) && self.thread_id == Some(t.thread_id),
            None => false,
        }
    }
}

// ── MainThread ────────────────────────────────────────────────────────────────

/// Process and thread ids of the renderer's main thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainThread {
    pub process_id: i64,
    pub thread_id: i64,
}

impl MainThread {
    /// Find the first `thread_name` event labelled `CrRendererMain`.
    pub fn locate(events: &[TraceEvent]) -> Option<Self> {
        events.iter().find_map(|e| {
            if e.name != THREAD_NAME_EVENT {
                return None;
            }
            let label = e.args.get("name").and_then(Value::as_str);
            if label != Some(RENDERER_MAIN_THREAD) {
                return None;
            }
            Some(Self {
                process_id: e.process_id?,
                thread_id: e.thread_id?,
            })
        })
    }
}

// ── TraceMetadata ─────────────────────────────────────────────────────────────

/// The free-form `metadata` object of a trace.
#[derive(Debug, Clone, Default)]
pub struct TraceMetadata {
    fields: Map<String, Value>,
}

impl TraceMetadata {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// `startTime` as displayed, or `"N/A"`.
    pub fn start_time(&self) -> String {
        self.get("startTime")
            .map(display_value)
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// `cpuThrottling` as displayed, defaulting to `1`.
    pub fn cpu_throttling(&self) -> String {
        self.get("cpuThrottling")
            .map(display_value)
            .unwrap_or_else(|| "1".to_string())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── TraceFile ─────────────────────────────────────────────────────────────────

/// A fully loaded trace document.
#[derive(Debug, Clone, Default)]
pub struct TraceFile {
    pub events: Vec<TraceEvent>,
    pub metadata: TraceMetadata,
    /// Length of the raw `traceEvents` array, including dropped entries.
    pub raw_event_count: usize,
}

impl TraceFile {
    /// Convert a parsed trace document.
    ///
    /// A missing `traceEvents` array yields an empty trace; entries that are
    /// not JSON objects are dropped but still counted in `raw_event_count`.
    pub fn from_value(document: &Value) -> Self {
        let raw_events = document
            .get("traceEvents")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let events: Vec<TraceEvent> = raw_events
            .iter()
            .filter(|v| v.is_object())
            .map(TraceEvent::from_value)
            .collect();

        if events.len() != raw_events.len() {
            debug!(
                "Dropped {} non-object trace events",
                raw_events.len() - events.len()
            );
        }

        let metadata = TraceMetadata {
            fields: document
                .get("metadata")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        };

        Self {
            events,
            metadata,
            raw_event_count: raw_events.len(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
