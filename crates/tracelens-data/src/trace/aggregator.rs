//! Single-pass classification of trace events into named buckets.

use tracelens_core::thresholds::{
    BEGIN_FRAME_EVENT, FIRE_ANIMATION_FRAME, FUNCTION_CALL_EVENT, GC_EVENTS, LAYOUT_EVENTS,
    LONG_TASK_US, PAINT_EVENTS, REQUEST_ANIMATION_FRAME, SCRIPT_EVENTS, UPDATE_COUNTERS_EVENT,
};

use super::{MainThread, TraceEvent, TraceFile, TraceMetadata};
use crate::bucket::{Bucket, BucketMap};
use crate::fields::{u64_field, url_basename};

// ── Records ───────────────────────────────────────────────────────────────────

/// The slice of a trace event kept for per-event reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    pub name: String,
    /// Microseconds.
    pub timestamp: f64,
    /// Microseconds.
    pub duration: f64,
}

impl TimedEvent {
    fn of(event: &TraceEvent) -> Self {
        Self {
            name: event.name.clone(),
            timestamp: event.timestamp,
            duration: event.duration,
        }
    }
}

/// One `UpdateCounters`-style memory sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySample {
    pub timestamp: f64,
    pub js_heap_size_used: u64,
    pub documents: u64,
    pub nodes: u64,
    pub js_event_listeners: u64,
}

/// All events of one analysis category, plus a per-name breakdown.
#[derive(Debug, Clone, Default)]
pub struct CategoryStats {
    /// Every matching event in trace order.
    pub events: Bucket<TimedEvent>,
    pub by_name: BucketMap,
}

impl CategoryStats {
    fn record(&mut self, event: &TraceEvent) {
        self.events.record(event.duration, TimedEvent::of(event));
        self.by_name.record(&event.name, event.duration, ());
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ── TraceAggregates ───────────────────────────────────────────────────────────

/// Read-only result of one aggregation pass. All durations are microseconds.
#[derive(Debug, Clone, Default)]
pub struct TraceAggregates {
    pub metadata: TraceMetadata,
    pub main_thread: Option<MainThread>,
    /// Entries in the trace, counting ones that were not usable events.
    pub total_events: usize,
    /// Main-thread tasks over the long-task threshold.
    pub long_tasks: CategoryStats,
    /// `FunctionCall` events keyed by `"{function} ({file})"`.
    pub function_calls: BucketMap,
    pub gc: CategoryStats,
    pub layout: CategoryStats,
    /// Forced layouts per layout event name.
    pub forced_layouts: BucketMap,
    pub paint: CategoryStats,
    /// Script evaluation keyed by script file name.
    pub scripts: BucketMap,
    /// `FireAnimationFrame` callbacks.
    pub animation_frames: Bucket<TimedEvent>,
    /// `RequestAnimationFrame` calls.
    pub animation_requests: Bucket,
    pub sockets: CategoryStats,
    pub memory: Vec<MemorySample>,
    /// `BeginFrame` timestamps in trace order.
    pub frame_timestamps: Vec<f64>,
}

// ── TraceAggregator ───────────────────────────────────────────────────────────

/// Routes each event into zero or more categories. Categories are
/// independent: a long `EvaluateScript` counts as both a long task and a
/// script evaluation.
#[derive(Debug, Default)]
pub struct TraceAggregator {
    aggregates: TraceAggregates,
}

impl TraceAggregator {
    pub fn new(main_thread: Option<MainThread>, metadata: TraceMetadata) -> Self {
        Self {
            aggregates: TraceAggregates {
                main_thread,
                metadata,
                ..TraceAggregates::default()
            },
        }
    }

    /// Locate the main thread and aggregate every event of `trace`.
    pub fn run(trace: &TraceFile) -> TraceAggregates {
        let main_thread = MainThread::locate(&trace.events);
        let mut aggregator = Self::new(main_thread, trace.metadata.clone());
        for event in &trace.events {
            aggregator.record(event);
        }
        let mut aggregates = aggregator.into_snapshot();
        aggregates.total_events = aggregates.total_events.max(trace.raw_event_count);
        aggregates
    }

    /// Classify one event and update every matching bucket.
    pub fn record(&mut self, event: &TraceEvent) {
        let agg = &mut self.aggregates;
        agg.total_events += 1;

        let name = event.name.as_str();
        let dur = event.duration;

        if event.is_on(agg.main_thread) && dur > LONG_TASK_US {
            agg.long_tasks.record(event);
        }

        if name == FUNCTION_CALL_EVENT && dur > 0.0 {
            agg.function_calls.record(&function_key(event), dur, ());
        }

        if name.contains("GC") || GC_EVENTS.contains(&name) {
            agg.gc.record(event);
        }

        if LAYOUT_EVENTS.contains(&name) {
            agg.layout.record(event);
            if event.data_str("frame") == "forced" {
                agg.forced_layouts.record(name, dur, ());
            }
        }

        if PAINT_EVENTS.contains(&name) {
            agg.paint.record(event);
        }

        if SCRIPT_EVENTS.contains(&name) {
            agg.scripts.record(url_basename(event.data_str("url")), dur, ());
        }

        if name == FIRE_ANIMATION_FRAME {
            agg.animation_frames.record(dur, TimedEvent::of(event));
        } else if name == REQUEST_ANIMATION_FRAME {
            agg.animation_requests.record(dur, ());
        }

        if name.to_lowercase().contains("websocket") {
            agg.sockets.record(event);
        }

        if name == UPDATE_COUNTERS_EVENT || event.category.to_lowercase().contains("memory") {
            if let Some(sample) = memory_sample(event) {
                agg.memory.push(sample);
            }
        }

        if name == BEGIN_FRAME_EVENT {
            agg.frame_timestamps.push(event.timestamp);
        }
    }

    pub fn snapshot(&self) -> &TraceAggregates {
        &self.aggregates
    }

    pub fn into_snapshot(self) -> TraceAggregates {
        self.aggregates
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `"{functionName} ({file})"`, with `anonymous` and `inline` fallbacks.
fn function_key(event: &TraceEvent) -> String {
    let function = match event.data_str("functionName") {
        "" => "anonymous",
        f => f,
    };
    format!("{} ({})", function, url_basename(event.data_str("url")))
}

fn memory_sample(event: &TraceEvent) -> Option<MemorySample> {
    let counters = event
        .args
        .get("data")
        .filter(|d| d.as_object().is_some_and(|m| !m.is_empty()))?;
    Some(MemorySample {
        timestamp: event.timestamp,
        js_heap_size_used: u64_field(counters, "jsHeapSizeUsed"),
        documents: u64_field(counters, "documents"),
        nodes: u64_field(counters, "nodes"),
        js_event_listeners: u64_field(counters, "jsEventListeners"),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const MAIN: MainThread = MainThread {
        process_id: 10,
        thread_id: 1,
    };

    fn event(value: Value) -> TraceEvent {
        TraceEvent::from_value(&value)
    }

    fn run(events: Vec<Value>) -> TraceAggregates {
        let mut aggregator = TraceAggregator::new(Some(MAIN), TraceMetadata::default());
        for value in events {
            aggregator.record(&event(value));
        }
        aggregator.into_snapshot()
    }

    // ── Long tasks ────────────────────────────────────────────────────────────

    #[test]
    fn test_long_task_main_thread_only() {
        let agg = run(vec![
            json!({"name": "RunTask", "pid": 10, "tid": 1, "dur": 60000}),
            json!({"name": "RunTask", "pid": 10, "tid": 2, "dur": 60000}),
            json!({"name": "RunTask", "pid": 11, "tid": 1, "dur": 60000}),
        ]);

        assert_eq!(agg.long_tasks.events.count, 1);
        assert_eq!(agg.long_tasks.events.records[0].duration, 60000.0);
        assert_eq!(agg.total_events, 3);
    }

    #[test]
    fn test_long_task_threshold_is_strict() {
        let agg = run(vec![
            json!({"name": "RunTask", "pid": 10, "tid": 1, "dur": 50000}),
            json!({"name": "RunTask", "pid": 10, "tid": 1, "dur": 50001}),
        ]);
        assert_eq!(agg.long_tasks.events.count, 1);
    }

    #[test]
    fn test_no_main_thread_means_no_long_tasks() {
        let mut aggregator = TraceAggregator::new(None, TraceMetadata::default());
        aggregator.record(&event(json!({"name": "RunTask", "dur": 90000})));
        assert!(aggregator.snapshot().long_tasks.is_empty());
    }

    #[test]
    fn test_long_task_also_counts_in_other_categories() {
        let agg = run(vec![json!({
            "name": "EvaluateScript", "pid": 10, "tid": 1, "dur": 80000,
            "args": {"data": {"url": "https://cdn/app.js"}},
        })]);
        assert_eq!(agg.long_tasks.events.count, 1);
        assert_eq!(agg.scripts.get("app.js").unwrap().count, 1);
    }

    // ── Function calls ────────────────────────────────────────────────────────

    #[test]
    fn test_function_call_keys() {
        let agg = run(vec![
            json!({"name": "FunctionCall", "dur": 100, "args": {"data": {"functionName": "draw", "url": "https://h/js/render.js"}}}),
            json!({"name": "FunctionCall", "dur": 300, "args": {"data": {"functionName": "draw", "url": "https://h/js/render.js"}}}),
            json!({"name": "FunctionCall", "dur": 50, "args": {"data": {}}}),
            json!({"name": "FunctionCall", "dur": 0, "args": {"data": {"functionName": "idle"}}}),
        ]);

        let draw = agg.function_calls.get("draw (render.js)").unwrap();
        assert_eq!(draw.count, 2);
        assert_eq!(draw.total_duration, 400.0);
        assert_eq!(draw.max_duration, 300.0);
        assert_eq!(agg.function_calls.get("anonymous (inline)").unwrap().count, 1);
        assert!(agg.function_calls.get("idle (inline)").is_none());
    }

    // ── GC / layout / paint ───────────────────────────────────────────────────

    #[test]
    fn test_gc_matches_substring_and_table() {
        let agg = run(vec![
            json!({"name": "MinorGC", "dur": 2000}),
            json!({"name": "V8.GCScavenger", "dur": 15000}),
            json!({"name": "BlinkGC", "dur": 1000}),
            json!({"name": "Layout", "dur": 1000}),
        ]);
        assert_eq!(agg.gc.events.count, 3);
        assert_eq!(agg.gc.by_name.len(), 3);
        assert_eq!(agg.gc.events.max_duration, 15000.0);
    }

    #[test]
    fn test_layout_forced_counts() {
        let agg = run(vec![
            json!({"name": "Layout", "dur": 100, "args": {"data": {"frame": "forced"}}}),
            json!({"name": "Layout", "dur": 100, "args": {"data": {"frame": "F1"}}}),
            json!({"name": "UpdateLayoutTree", "dur": 100}),
        ]);
        assert_eq!(agg.layout.events.count, 3);
        assert_eq!(agg.layout.by_name.get("Layout").unwrap().count, 2);
        assert_eq!(agg.forced_layouts.get("Layout").unwrap().count, 1);
        assert!(agg.forced_layouts.get("UpdateLayoutTree").is_none());
    }

    #[test]
    fn test_paint_table_is_exact() {
        let agg = run(vec![
            json!({"name": "Paint", "dur": 100}),
            json!({"name": "RasterTask", "dur": 100}),
            json!({"name": "PaintSetup", "dur": 100}),
        ]);
        assert_eq!(agg.paint.events.count, 2);
    }

    // ── Animation frames / sockets ────────────────────────────────────────────

    #[test]
    fn test_animation_frames_split() {
        let agg = run(vec![
            json!({"name": "FireAnimationFrame", "dur": 20000}),
            json!({"name": "RequestAnimationFrame"}),
            json!({"name": "RequestAnimationFrame"}),
        ]);
        assert_eq!(agg.animation_frames.count, 1);
        assert_eq!(agg.animation_requests.count, 2);
    }

    #[test]
    fn test_socket_match_is_case_insensitive() {
        let agg = run(vec![
            json!({"name": "WebSocketReceiveHandshakeResponse"}),
            json!({"name": "websocket.send"}),
            json!({"name": "XHRReadyStateChange"}),
        ]);
        assert_eq!(agg.sockets.events.count, 2);
    }

    // ── Memory / frames ───────────────────────────────────────────────────────

    #[test]
    fn test_memory_samples_need_data() {
        let agg = run(vec![
            json!({"name": "UpdateCounters", "ts": 1, "args": {"data": {"jsHeapSizeUsed": 1024, "nodes": 50, "jsEventListeners": 3, "documents": 1}}}),
            json!({"name": "UpdateCounters", "ts": 2, "args": {"data": {}}}),
            json!({"name": "Other", "cat": "disabled-by-default-devtools.Memory", "ts": 3, "args": {"data": {"jsHeapSizeUsed": 2048}}}),
        ]);
        assert_eq!(agg.memory.len(), 2);
        assert_eq!(agg.memory[0].nodes, 50);
        assert_eq!(agg.memory[1].js_heap_size_used, 2048);
        assert_eq!(agg.memory[1].nodes, 0);
    }

    #[test]
    fn test_begin_frame_timestamps_in_order() {
        let agg = run(vec![
            json!({"name": "BeginFrame", "ts": 100}),
            json!({"name": "BeginFrame", "ts": 16800}),
        ]);
        assert_eq!(agg.frame_timestamps, vec![100.0, 16800.0]);
    }

    // ── run ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_run_locates_main_thread() {
        let trace = TraceFile::from_value(&json!({
            "traceEvents": [
                {"name": "thread_name", "pid": 3, "tid": 5, "args": {"name": "CrRendererMain"}},
                {"name": "RunTask", "pid": 3, "tid": 5, "dur": 70000},
                {"name": "RunTask", "pid": 3, "tid": 6, "dur": 70000},
            ],
        }));
        let agg = TraceAggregator::run(&trace);
        assert_eq!(agg.main_thread, Some(MainThread { process_id: 3, thread_id: 5 }));
        assert_eq!(agg.long_tasks.events.count, 1);
        assert_eq!(agg.total_events, 3);
    }

    #[test]
    fn test_run_counts_dropped_entries_in_total() {
        let trace = TraceFile::from_value(&json!({
            "traceEvents": [{"name": "Paint", "dur": 7}, null, 42, {"name": "Layout"}],
        }));
        let agg = TraceAggregator::run(&trace);
        assert_eq!(agg.total_events, 4);
        assert_eq!(agg.paint.events.count, 1);
    }

    #[test]
    fn test_run_is_idempotent() {
        let trace = TraceFile::from_value(&json!({
            "traceEvents": [
                {"name": "FunctionCall", "dur": 5, "args": {"data": {"functionName": "a"}}},
                {"name": "FunctionCall", "dur": 5, "args": {"data": {"functionName": "b"}}},
                {"name": "Paint", "dur": 7},
            ],
        }));
        let first = TraceAggregator::run(&trace);
        let second = TraceAggregator::run(&trace);
        let keys = |a: &TraceAggregates| -> Vec<String> {
            a.function_calls.sorted_by_total_desc().iter().map(|(k, _)| k.to_string()).collect()
        };
        assert_eq!(keys(&first), keys(&second));
        assert_eq!(first.paint.events.count, second.paint.events.count);
    }
}
