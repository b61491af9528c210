//! Derived views over a finished [`TraceAggregates`] snapshot.
//!
//! Nothing here is incremental: each view is computed once, after the pass,
//! from the accumulated buckets.

use tracelens_core::formatting::{bytes_to_mb, micros_to_ms};
use tracelens_core::thresholds::{
    DOM_NODE_GROWTH_ADVISORY, DOM_NODE_GROWTH_ISSUE, DROPPED_FRAME_MS, FRAME_DELTA_MAX_MS,
    GC_SPIKE_MS, HEAP_GROWTH_MB, JANK_FRAME_MS, LAYOUT_THRASH_COUNT, LAYOUT_THRASH_MIN_EVENTS,
    LAYOUT_THRASH_WINDOW_US, LISTENER_GROWTH_ADVISORY, LISTENER_GROWTH_ISSUE, RAF_BUDGET_MS,
    RAF_RANGES_MS,
};

use super::aggregator::{CategoryStats, MemorySample, TimedEvent};
use crate::bucket::Bucket;

// ── Ranking ───────────────────────────────────────────────────────────────────

/// Events ordered by descending duration; equal durations keep trace order.
pub fn by_duration_desc(events: &[TimedEvent]) -> Vec<&TimedEvent> {
    let mut sorted: Vec<&TimedEvent> = events.iter().collect();
    sorted.sort_by(|a, b| b.duration.total_cmp(&a.duration));
    sorted
}

/// GC pauses above the spike threshold, longest first.
pub fn gc_spikes(gc: &CategoryStats) -> Vec<&TimedEvent> {
    by_duration_desc(&gc.events.records)
        .into_iter()
        .filter(|e| micros_to_ms(e.duration) > GC_SPIKE_MS)
        .collect()
}

// ── Layout thrashing ──────────────────────────────────────────────────────────

/// A window start with at least [`LAYOUT_THRASH_COUNT`] layouts inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrashPeriod {
    /// Microseconds.
    pub timestamp: f64,
    /// Layouts within the window starting at `timestamp`, inclusive.
    pub count: usize,
}

/// Find every layout event that opens a thrashing window.
///
/// Only evaluated once there are more than [`LAYOUT_THRASH_MIN_EVENTS`]
/// layouts. Events are sorted by timestamp; for each event `i`, the window
/// holds every later-or-equal event whose timestamp is less than one window
/// width after it. Because the sequence is sorted the window end only moves
/// forward, so a single trailing pointer gives the same counts as rescanning
/// from every event.
pub fn thrashing_periods(layout: &CategoryStats) -> Vec<ThrashPeriod> {
    let events = &layout.events.records;
    if events.len() <= LAYOUT_THRASH_MIN_EVENTS {
        return Vec::new();
    }

    let mut timestamps: Vec<f64> = events.iter().map(|e| e.timestamp).collect();
    timestamps.sort_by(f64::total_cmp);

    let mut periods = Vec::new();
    let mut end = 0;
    for (start, &ts) in timestamps.iter().enumerate() {
        end = end.max(start);
        while end < timestamps.len() && timestamps[end] - ts < LAYOUT_THRASH_WINDOW_US {
            end += 1;
        }
        let count = end - start;
        if count >= LAYOUT_THRASH_COUNT {
            periods.push(ThrashPeriod {
                timestamp: ts,
                count,
            });
        }
    }
    periods
}

// ── Animation frames ──────────────────────────────────────────────────────────

/// Summary of `FireAnimationFrame` callbacks. Durations in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RafStats {
    pub callbacks: u64,
    pub total_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    /// Callbacks over the frame budget.
    pub over_budget: usize,
    /// `(label, count)` for each non-empty over-budget range.
    pub distribution: Vec<(String, usize)>,
}

impl RafStats {
    pub fn from_bucket(frames: &Bucket<TimedEvent>) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        let durations: Vec<f64> = frames
            .records
            .iter()
            .map(|e| micros_to_ms(e.duration))
            .collect();

        let distribution = RAF_RANGES_MS
            .iter()
            .filter_map(|&(low, high)| {
                let count = durations
                    .iter()
                    .filter(|&&d| d >= low && high.map_or(true, |h| d < h))
                    .count();
                let label = match high {
                    Some(h) => format!("{}-{}ms", low, h),
                    None => format!("{}-INFms", low),
                };
                (count > 0).then_some((label, count))
            })
            .collect();

        Some(Self {
            callbacks: frames.count,
            total_ms: micros_to_ms(frames.total_duration),
            avg_ms: micros_to_ms(frames.mean_duration()),
            max_ms: micros_to_ms(frames.max_duration),
            over_budget: durations.iter().filter(|&&d| d > RAF_BUDGET_MS).count(),
            distribution,
        })
    }

    /// Share of callbacks over budget, `0.0..=1.0`.
    pub fn over_budget_ratio(&self) -> f64 {
        if self.callbacks == 0 {
            0.0
        } else {
            self.over_budget as f64 / self.callbacks as f64
        }
    }
}

// ── Memory ────────────────────────────────────────────────────────────────────

/// Minimum and maximum of a counter across memory samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRange {
    pub min: u64,
    pub max: u64,
}

impl CounterRange {
    fn over(values: impl Iterator<Item = u64>) -> Option<Self> {
        values.fold(None, |acc, v| match acc {
            None => Some(Self { min: v, max: v }),
            Some(r) => Some(Self {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    pub fn growth(&self) -> u64 {
        self.max - self.min
    }
}

/// Heap, DOM node and listener trends over samples with a non-zero heap.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStats {
    pub valid_samples: usize,
    pub heap_min_mb: f64,
    pub heap_max_mb: f64,
    pub heap_avg_mb: f64,
    /// Range over samples with a non-zero node count.
    pub nodes: Option<CounterRange>,
    /// Whether the first valid sample carried a node count.
    pub nodes_in_first_sample: bool,
    /// Range over samples with a non-zero listener count.
    pub listeners: Option<CounterRange>,
    /// Whether the first valid sample carried a listener count.
    pub listeners_in_first_sample: bool,
}

impl MemoryStats {
    /// `None` when no sample has a non-zero heap size.
    pub fn from_samples(samples: &[MemorySample]) -> Option<Self> {
        let valid: Vec<&MemorySample> = samples.iter().filter(|s| s.js_heap_size_used > 0).collect();
        let first = valid.first()?;

        let heap = CounterRange::over(valid.iter().map(|s| s.js_heap_size_used))?;
        let heap_sum: f64 = valid.iter().map(|s| s.js_heap_size_used as f64).sum();

        Some(Self {
            valid_samples: valid.len(),
            heap_min_mb: bytes_to_mb(heap.min as f64),
            heap_max_mb: bytes_to_mb(heap.max as f64),
            heap_avg_mb: bytes_to_mb(heap_sum / valid.len() as f64),
            nodes: CounterRange::over(valid.iter().map(|s| s.nodes).filter(|&n| n > 0)),
            nodes_in_first_sample: first.nodes > 0,
            listeners: CounterRange::over(
                valid.iter().map(|s| s.js_event_listeners).filter(|&n| n > 0),
            ),
            listeners_in_first_sample: first.js_event_listeners > 0,
        })
    }

    pub fn heap_growth_mb(&self) -> f64 {
        self.heap_max_mb - self.heap_min_mb
    }

    pub fn is_potential_leak(&self) -> bool {
        self.heap_growth_mb() > HEAP_GROWTH_MB
    }

    /// Node growth worth an advisory line in the memory section.
    pub fn node_growth_advisory(&self) -> Option<u64> {
        self.nodes
            .map(|r| r.growth())
            .filter(|&g| g > DOM_NODE_GROWTH_ADVISORY)
    }

    /// Node growth worth a summary issue.
    pub fn node_growth_issue(&self) -> Option<u64> {
        self.nodes
            .map(|r| r.growth())
            .filter(|&g| g > DOM_NODE_GROWTH_ISSUE)
    }

    pub fn listener_growth_advisory(&self) -> Option<u64> {
        self.listeners
            .map(|r| r.growth())
            .filter(|&g| g > LISTENER_GROWTH_ADVISORY)
    }

    pub fn listener_growth_issue(&self) -> Option<u64> {
        self.listeners
            .map(|r| r.growth())
            .filter(|&g| g > LISTENER_GROWTH_ISSUE)
    }
}

// ── Frame rate ────────────────────────────────────────────────────────────────

/// Frame pacing derived from `BeginFrame` timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub frame_count: usize,
    /// Deltas kept after outlier removal.
    pub deltas: usize,
    pub avg_frame_ms: f64,
    pub fps: f64,
    pub dropped: usize,
    pub jank: usize,
}

impl FrameStats {
    /// `None` with fewer than two frames or when every delta is an outlier.
    pub fn from_timestamps(timestamps: &[f64]) -> Option<Self> {
        if timestamps.len() < 2 {
            return None;
        }
        let deltas: Vec<f64> = timestamps
            .windows(2)
            .map(|w| micros_to_ms(w[1] - w[0]))
            .filter(|&d| d > 0.0 && d < FRAME_DELTA_MAX_MS)
            .collect();
        if deltas.is_empty() {
            return None;
        }

        let avg = deltas.iter().sum::<f64>() / deltas.len() as f64;
        Some(Self {
            frame_count: timestamps.len(),
            deltas: deltas.len(),
            avg_frame_ms: avg,
            fps: if avg > 0.0 { 1000.0 / avg } else { 0.0 },
            dropped: deltas.iter().filter(|&&d| d > DROPPED_FRAME_MS).count(),
            jank: deltas.iter().filter(|&&d| d > JANK_FRAME_MS).count(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketMap;

    const MB: u64 = 1024 * 1024;

    fn timed(name: &str, timestamp: f64, duration: f64) -> TimedEvent {
        TimedEvent {
            name: name.to_string(),
            timestamp,
            duration,
        }
    }

    fn category(events: Vec<TimedEvent>) -> CategoryStats {
        let mut stats = CategoryStats {
            events: Bucket::new(),
            by_name: BucketMap::new(),
        };
        for e in events {
            stats.by_name.record(&e.name, e.duration, ());
            stats.events.record(e.duration, e);
        }
        stats
    }

    fn heap_sample(heap: u64, nodes: u64, listeners: u64) -> MemorySample {
        MemorySample {
            js_heap_size_used: heap,
            nodes,
            js_event_listeners: listeners,
            ..MemorySample::default()
        }
    }

    // ── by_duration_desc / gc_spikes ──────────────────────────────────────────

    #[test]
    fn test_by_duration_desc_stable() {
        let events = vec![timed("a", 0.0, 5.0), timed("b", 1.0, 9.0), timed("c", 2.0, 5.0)];
        let names: Vec<&str> = by_duration_desc(&events).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_gc_spikes_strictly_over_ten_ms() {
        let gc = category(vec![
            timed("MinorGC", 0.0, 10_000.0),
            timed("MajorGC", 1.0, 10_001.0),
            timed("MajorGC", 2.0, 40_000.0),
        ]);
        let spikes = gc_spikes(&gc);
        assert_eq!(spikes.len(), 2);
        assert_eq!(spikes[0].duration, 40_000.0);
    }

    // ── thrashing_periods ─────────────────────────────────────────────────────

    #[test]
    fn test_thrashing_requires_more_than_hundred_layouts() {
        let layout = category((0..100).map(|i| timed("Layout", i as f64, 10.0)).collect());
        assert!(thrashing_periods(&layout).is_empty());
    }

    #[test]
    fn test_thrashing_detects_dense_windows() {
        // 101 layouts spaced 1s apart, then a burst of 12 layouts 1ms apart.
        let mut events: Vec<TimedEvent> = (0..101)
            .map(|i| timed("Layout", i as f64 * 1_000_000.0, 10.0))
            .collect();
        let burst_start = 500_000_000.0;
        events.extend((0..12).map(|i| timed("Layout", burst_start + i as f64 * 1000.0, 10.0)));

        let periods = thrashing_periods(&category(events));
        // Window starts at burst offsets 0, 1 and 2 still see >= 10 layouts.
        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].timestamp, burst_start);
        assert_eq!(periods[0].count, 12);
        assert_eq!(periods[2].count, 10);
    }

    #[test]
    fn test_thrashing_matches_rescan() {
        let events: Vec<TimedEvent> = (0..150)
            .map(|i| timed("Layout", ((i * 7919) % 600) as f64 * 1000.0, 1.0))
            .collect();
        let layout = category(events);

        let mut sorted: Vec<f64> = layout.events.records.iter().map(|e| e.timestamp).collect();
        sorted.sort_by(f64::total_cmp);
        let expected: Vec<usize> = (0..sorted.len())
            .map(|i| {
                sorted[i..]
                    .iter()
                    .filter(|&&t| t - sorted[i] < LAYOUT_THRASH_WINDOW_US)
                    .count()
            })
            .filter(|&c| c >= LAYOUT_THRASH_COUNT)
            .collect();

        let actual: Vec<usize> = thrashing_periods(&layout).iter().map(|p| p.count).collect();
        assert_eq!(actual, expected);
    }

    // ── RafStats ──────────────────────────────────────────────────────────────

    #[test]
    fn test_raf_stats_empty() {
        assert!(RafStats::from_bucket(&Bucket::new()).is_none());
    }

    #[test]
    fn test_raf_stats_distribution() {
        let mut frames = Bucket::new();
        for (i, ms) in [8.0, 16.0, 20.0, 40.0, 75.0, 150.0].iter().enumerate() {
            frames.record(ms * 1000.0, timed("FireAnimationFrame", i as f64, ms * 1000.0));
        }
        let stats = RafStats::from_bucket(&frames).unwrap();

        assert_eq!(stats.callbacks, 6);
        assert_eq!(stats.over_budget, 4);
        assert_eq!(stats.max_ms, 150.0);
        assert_eq!(
            stats.distribution,
            vec![
                ("16-32ms".to_string(), 2),
                ("32-50ms".to_string(), 1),
                ("50-100ms".to_string(), 1),
                ("100-INFms".to_string(), 1),
            ]
        );
        assert!((stats.over_budget_ratio() - 4.0 / 6.0).abs() < 1e-12);
    }

    // ── MemoryStats ───────────────────────────────────────────────────────────

    #[test]
    fn test_memory_stats_ignores_zero_heap() {
        assert!(MemoryStats::from_samples(&[heap_sample(0, 10, 1)]).is_none());
        assert!(MemoryStats::from_samples(&[]).is_none());
    }

    #[test]
    fn test_heap_growth_of_51_mb_is_a_leak() {
        let stats = MemoryStats::from_samples(&[
            heap_sample(10 * MB, 0, 0),
            heap_sample(61 * MB, 0, 0),
        ])
        .unwrap();
        assert_eq!(stats.heap_growth_mb(), 51.0);
        assert!(stats.is_potential_leak());
    }

    #[test]
    fn test_heap_growth_of_50_mb_is_not_a_leak() {
        let stats = MemoryStats::from_samples(&[
            heap_sample(10 * MB, 0, 0),
            heap_sample(60 * MB, 0, 0),
        ])
        .unwrap();
        assert_eq!(stats.heap_growth_mb(), 50.0);
        assert!(!stats.is_potential_leak());
    }

    #[test]
    fn test_node_and_listener_growth_levels() {
        let stats = MemoryStats::from_samples(&[
            heap_sample(MB, 1000, 10),
            heap_sample(MB, 0, 0),
            heap_sample(MB, 3000, 200),
        ])
        .unwrap();

        assert_eq!(stats.nodes, Some(CounterRange { min: 1000, max: 3000 }));
        assert!(stats.nodes_in_first_sample);
        assert_eq!(stats.node_growth_advisory(), Some(2000));
        assert_eq!(stats.node_growth_issue(), None);
        assert_eq!(stats.listener_growth_advisory(), Some(190));
        assert_eq!(stats.listener_growth_issue(), None);
    }

    #[test]
    fn test_counters_absent_from_first_sample() {
        let stats = MemoryStats::from_samples(&[heap_sample(MB, 0, 0), heap_sample(2 * MB, 9000, 900)]).unwrap();
        assert!(!stats.nodes_in_first_sample);
        assert!(!stats.listeners_in_first_sample);
        assert_eq!(stats.node_growth_issue(), None);
        assert_eq!(stats.heap_avg_mb, 1.5);
    }

    // ── FrameStats ────────────────────────────────────────────────────────────

    #[test]
    fn test_frame_stats_requires_two_frames() {
        assert!(FrameStats::from_timestamps(&[]).is_none());
        assert!(FrameStats::from_timestamps(&[100.0]).is_none());
    }

    #[test]
    fn test_frame_stats_filters_outliers() {
        // deltas: 16ms, 40ms, 60ms, 2000ms (outlier), 0ms (outlier)
        let ts = [0.0, 16_000.0, 56_000.0, 116_000.0, 2_116_000.0, 2_116_000.0];
        let stats = FrameStats::from_timestamps(&ts).unwrap();

        assert_eq!(stats.frame_count, 6);
        assert_eq!(stats.deltas, 3);
        assert!((stats.avg_frame_ms - 116.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.jank, 1);
    }
}
