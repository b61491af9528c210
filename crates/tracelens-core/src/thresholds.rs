//! Named threshold and classification tables.
//!
//! Every magic number the analyzers compare against lives here so the rules
//! can be audited and unit-tested apart from parsing.

// ── Trace: time units ─────────────────────────────────────────────────────────

/// Trace timestamps and durations are expressed in microseconds.
pub const MICROS_PER_MS: f64 = 1000.0;

/// Bytes in one megabyte, as used for heap sizes.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// ── Trace: main thread ────────────────────────────────────────────────────────

/// Name of the metadata event that labels a thread.
pub const THREAD_NAME_EVENT: &str = "thread_name";

/// Label carried by the renderer's main thread.
pub const RENDERER_MAIN_THREAD: &str = "CrRendererMain";

// ── Trace: per-section thresholds ─────────────────────────────────────────────

/// A main-thread task longer than this (µs) is a long task.
pub const LONG_TASK_US: f64 = 50_000.0;

/// Animation-frame callback budget in milliseconds.
pub const RAF_BUDGET_MS: f64 = 16.0;

/// Distribution ranges for over-budget animation frames, `[low, high)` in ms.
/// `None` as the upper bound means unbounded.
pub const RAF_RANGES_MS: &[(f64, Option<f64>)] = &[
    (16.0, Some(32.0)),
    (32.0, Some(50.0)),
    (50.0, Some(100.0)),
    (100.0, None),
];

/// A single GC pause longer than this (ms) is a spike.
pub const GC_SPIKE_MS: f64 = 10.0;

/// Heap growth above this many MB is a potential leak.
pub const HEAP_GROWTH_MB: f64 = 50.0;

/// DOM node growth above this is reported in the memory section.
pub const DOM_NODE_GROWTH_ADVISORY: u64 = 1000;

/// DOM node growth above this is a summary issue.
pub const DOM_NODE_GROWTH_ISSUE: u64 = 5000;

/// Event-listener growth above this is reported in the memory section.
pub const LISTENER_GROWTH_ADVISORY: u64 = 100;

/// Event-listener growth above this is a summary issue.
pub const LISTENER_GROWTH_ISSUE: u64 = 500;

/// Thrashing is only checked once there are more layout events than this.
pub const LAYOUT_THRASH_MIN_EVENTS: usize = 100;

/// Width of the layout thrashing window in microseconds.
pub const LAYOUT_THRASH_WINDOW_US: f64 = 100_000.0;

/// Layout events inside one window that count as thrashing.
pub const LAYOUT_THRASH_COUNT: usize = 10;

/// Frame deltas outside `(0, FRAME_DELTA_MAX_MS)` are discarded as outliers.
pub const FRAME_DELTA_MAX_MS: f64 = 1000.0;

/// A frame delta above this (ms) is a dropped frame (below 30 fps).
pub const DROPPED_FRAME_MS: f64 = 33.0;

/// A frame delta above this (ms) is jank.
pub const JANK_FRAME_MS: f64 = 50.0;

// ── Trace: summary gates ──────────────────────────────────────────────────────

/// More long tasks than this is a high-severity issue.
pub const SUMMARY_LONG_TASK_COUNT: usize = 10;

/// More total GC time (ms) than this is a medium-severity issue.
pub const SUMMARY_GC_TOTAL_MS: f64 = 1000.0;

/// More layout events than this is a medium-severity issue.
pub const SUMMARY_LAYOUT_COUNT: usize = 1000;

/// A larger share of over-budget animation frames than this is high severity.
pub const SUMMARY_LONG_RAF_RATIO: f64 = 0.2;

// ── Trace: event name tables ──────────────────────────────────────────────────

pub const FUNCTION_CALL_EVENT: &str = "FunctionCall";

pub const GC_EVENTS: &[&str] = &["MinorGC", "MajorGC", "V8.GC", "BlinkGC"];

pub const LAYOUT_EVENTS: &[&str] = &[
    "Layout",
    "UpdateLayoutTree",
    "RecalculateStyles",
    "InvalidateLayout",
];

pub const PAINT_EVENTS: &[&str] = &[
    "Paint",
    "PaintImage",
    "CompositeLayers",
    "UpdateLayer",
    "RasterTask",
];

pub const SCRIPT_EVENTS: &[&str] = &["EvaluateScript", "v8.compile", "v8.run"];

pub const FIRE_ANIMATION_FRAME: &str = "FireAnimationFrame";
pub const REQUEST_ANIMATION_FRAME: &str = "RequestAnimationFrame";

pub const UPDATE_COUNTERS_EVENT: &str = "UpdateCounters";
pub const BEGIN_FRAME_EVENT: &str = "BeginFrame";

// ── Harvest ───────────────────────────────────────────────────────────────────

/// Mobile type id the game assigns to every living (animate) resource.
pub const LIVING_MOBILE_TYPE_ID: i64 = 65535;

/// Substring that marks a log category as a harvest event.
pub const HARVEST_CATEGORY_MARKER: &str = "HARVEST";

/// The tier whose events are checked against the anomaly rules.
pub const INSPECTED_TIER: i64 = 6;

/// Tiers shown in the per-resource-type section of the report.
pub const FOCUS_TIERS: &[i64] = &[5, 6];

/// Categories that are only correct for one tier: `(category, tier)`.
pub const CATEGORY_TIERS: &[(&str, i64)] = &[("HARVEST_HIDE_T4", 4)];

/// Resource type used when an event does not name one.
pub const UNKNOWN_RESOURCE_TYPE: &str = "Unknown";

/// Directories searched, in order, for the latest session log.
pub const HARVEST_LOG_DIRS: &[&str] = &["dist/logs/sessions", "logs/sessions"];

/// Expected tier for `category`, when the category is tier-specific.
pub fn category_tier(category: &str) -> Option<i64> {
    CATEGORY_TIERS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, tier)| *tier)
}

/// Whether a `mobileTypeId` marks a living resource. Absent means static.
pub fn is_living(mobile_type_id: Option<i64>) -> bool {
    mobile_type_id == Some(LIVING_MOBILE_TYPE_ID)
}
