//! Text report for an aggregated Chrome performance trace.

use std::fmt;

use tracelens_core::formatting::{format_count, micros_to_ms, percentage};
use tracelens_core::thresholds::{
    DROPPED_FRAME_MS, GC_SPIKE_MS, JANK_FRAME_MS, LAYOUT_THRASH_COUNT, LAYOUT_THRASH_WINDOW_US,
    LONG_TASK_US, RAF_BUDGET_MS,
};
use tracelens_data::trace::stats::{
    by_duration_desc, gc_spikes, thrashing_periods, FrameStats, MemoryStats, RafStats,
};
use tracelens_data::trace::{summarize_issues, TraceAggregates};

use crate::text::{pad, section, truncate};

const WIDTH: usize = 60;
const TOP_LONG_TASKS: usize = 20;
const TOP_LONG_TASK_TYPES: usize = 15;
const TOP_FUNCTIONS: usize = 20;
const TOP_GC_SPIKES: usize = 10;
const TOP_SCRIPTS: usize = 15;

/// Render the complete trace report.
pub fn render(agg: &TraceAggregates) -> String {
    TraceReport(agg).to_string()
}

/// Display adapter; sections are written in a fixed order.
pub struct TraceReport<'a>(pub &'a TraceAggregates);

impl fmt::Display for TraceReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let agg = self.0;
        render_header(f, agg)?;
        render_long_tasks(f, agg)?;
        render_function_calls(f, agg)?;
        render_gc(f, agg)?;
        render_layout(f, agg)?;
        render_paint(f, agg)?;
        render_scripts(f, agg)?;
        render_animation_frames(f, agg)?;
        render_sockets(f, agg)?;
        render_memory(f, agg)?;
        render_frame_rate(f, agg)?;
        render_summary(f, agg)
    }
}

fn ms(micros: f64) -> f64 {
    micros_to_ms(micros)
}

fn render_header(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    section(f, "CHROME DEVTOOLS PERFORMANCE TRACE ANALYSIS", WIDTH)?;
    writeln!(f, "\nMetadata:")?;
    writeln!(f, "  Start Time: {}", agg.metadata.start_time())?;
    writeln!(f, "  CPU Throttling: {}x", agg.metadata.cpu_throttling())?;
    writeln!(f, "  Total Events: {}", format_count(agg.total_events as u64))?;
    match agg.main_thread {
        Some(t) => writeln!(f, "  Renderer PID: {}, Main TID: {}", t.process_id, t.thread_id),
        None => writeln!(f, "  Renderer PID: none, Main TID: none"),
    }
}

fn render_long_tasks(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    let title = format!("1. LONG TASKS (>{}ms on main thread)", ms(LONG_TASK_US));
    section(f, &title, WIDTH)?;

    let tasks = &agg.long_tasks;
    if tasks.is_empty() {
        return writeln!(f, "  No long tasks detected (good!)");
    }

    writeln!(f, "\nFound {} long tasks", tasks.events.count)?;
    writeln!(f, "\nTop {} longest tasks:", TOP_LONG_TASKS)?;
    for (i, task) in by_duration_desc(&tasks.events.records)
        .into_iter()
        .take(TOP_LONG_TASKS)
        .enumerate()
    {
        writeln!(f, "  {:2}. {} {:>8.1}ms", i + 1, pad(&task.name, 40), ms(task.duration))?;
    }

    writeln!(f, "\nLong tasks aggregated by type:")?;
    for (name, stats) in tasks
        .by_name
        .sorted_by_total_desc()
        .into_iter()
        .take(TOP_LONG_TASK_TYPES)
    {
        writeln!(
            f,
            "  {} count={:>4}, total={:>8.1}ms, max={:>8.1}ms",
            pad(name, 40),
            stats.count,
            ms(stats.total_duration),
            ms(stats.max_duration)
        )?;
    }
    Ok(())
}

fn render_function_calls(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    section(f, "2. EXPENSIVE FUNCTION CALLS", WIDTH)?;

    if agg.function_calls.is_empty() {
        return writeln!(f, "  No function call data available");
    }

    writeln!(f, "\nTop {} most expensive functions (by total time):", TOP_FUNCTIONS)?;
    for (i, (name, stats)) in agg
        .function_calls
        .sorted_by_total_desc()
        .into_iter()
        .take(TOP_FUNCTIONS)
        .enumerate()
    {
        writeln!(f, "  {:2}. {}", i + 1, pad(truncate(name, 50), 50))?;
        writeln!(
            f,
            "      count={:>5}, total={:>8.1}ms, avg={:>6.2}ms, max={:>8.1}ms",
            stats.count,
            ms(stats.total_duration),
            ms(stats.mean_duration()),
            ms(stats.max_duration)
        )?;
    }
    Ok(())
}

fn render_gc(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    section(f, "3. GARBAGE COLLECTION", WIDTH)?;

    let gc = &agg.gc;
    if gc.is_empty() {
        return writeln!(f, "  No GC events recorded");
    }

    writeln!(f, "\nTotal GC events: {}", gc.events.count)?;
    writeln!(f, "Total GC time: {:.1}ms", ms(gc.events.total_duration))?;
    writeln!(f, "\nGC by type:")?;
    for (name, stats) in gc.by_name.sorted_by_total_desc() {
        writeln!(
            f,
            "  {} count={:>4}, total={:>8.1}ms, max={:>6.1}ms",
            pad(name, 30),
            stats.count,
            ms(stats.total_duration),
            ms(stats.max_duration)
        )?;
    }

    let spikes = gc_spikes(gc);
    if !spikes.is_empty() {
        writeln!(f, "\nGC spikes (>{}ms): {}", GC_SPIKE_MS, spikes.len())?;
        for spike in spikes.into_iter().take(TOP_GC_SPIKES) {
            writeln!(f, "  {} {:>6.1}ms", pad(&spike.name, 30), ms(spike.duration))?;
        }
    }
    Ok(())
}

fn render_layout(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    section(f, "4. LAYOUT/REFLOW ANALYSIS", WIDTH)?;

    let layout = &agg.layout;
    if layout.is_empty() {
        return writeln!(f, "  No layout events recorded");
    }

    writeln!(f, "\nTotal layout events: {}", layout.events.count)?;
    writeln!(f, "Total layout time: {:.1}ms", ms(layout.events.total_duration))?;
    writeln!(f, "\nLayout by type:")?;
    for (name, stats) in layout.by_name.sorted_by_total_desc() {
        let forced = agg.forced_layouts.get(name).map_or(0, |b| b.count);
        let forced_str = if forced > 0 {
            format!(", FORCED={}", forced)
        } else {
            String::new()
        };
        writeln!(
            f,
            "  {} count={:>5}, total={:>8.1}ms, max={:>6.1}ms{}",
            pad(name, 25),
            stats.count,
            ms(stats.total_duration),
            ms(stats.max_duration),
            forced_str
        )?;
    }

    let periods = thrashing_periods(layout);
    if !periods.is_empty() {
        writeln!(
            f,
            "\n[!] LAYOUT THRASHING DETECTED: {} periods with {}+ layouts in {}ms",
            periods.len(),
            LAYOUT_THRASH_COUNT,
            ms(LAYOUT_THRASH_WINDOW_US)
        )?;
    }
    Ok(())
}

fn render_paint(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    section(f, "5. PAINT/RENDER ANALYSIS", WIDTH)?;

    let paint = &agg.paint;
    if paint.is_empty() {
        return writeln!(f, "  No paint events recorded");
    }

    writeln!(f, "\nTotal paint events: {}", paint.events.count)?;
    writeln!(f, "Total paint time: {:.1}ms", ms(paint.events.total_duration))?;
    writeln!(f, "\nPaint by type:")?;
    for (name, stats) in paint.by_name.sorted_by_total_desc() {
        writeln!(
            f,
            "  {} count={:>5}, total={:>8.1}ms, max={:>6.1}ms",
            pad(name, 25),
            stats.count,
            ms(stats.total_duration),
            ms(stats.max_duration)
        )?;
    }
    Ok(())
}

fn render_scripts(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    section(f, "6. SCRIPT EVALUATION", WIDTH)?;

    if agg.scripts.is_empty() {
        return writeln!(f, "  No script evaluation events recorded");
    }

    writeln!(f, "\nScript evaluation by file:")?;
    for (url, stats) in agg.scripts.sorted_by_total_desc().into_iter().take(TOP_SCRIPTS) {
        writeln!(
            f,
            "  {} count={:>3}, total={:>8.1}ms",
            pad(url, 40),
            stats.count,
            ms(stats.total_duration)
        )?;
    }
    Ok(())
}

fn render_animation_frames(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    section(f, "7. ANIMATION FRAMES (requestAnimationFrame)", WIDTH)?;

    let Some(raf) = RafStats::from_bucket(&agg.animation_frames) else {
        if agg.animation_requests.is_empty() {
            return writeln!(f, "  No RAF events recorded");
        }
        return writeln!(
            f,
            "  {} RAF requests, no callbacks fired",
            agg.animation_requests.count
        );
    };

    writeln!(f, "\nTotal RAF callbacks: {}", raf.callbacks)?;
    writeln!(f, "Total RAF time: {:.1}ms", raf.total_ms)?;
    writeln!(f, "Average RAF time: {:.2}ms", raf.avg_ms)?;
    writeln!(f, "Max RAF time: {:.1}ms", raf.max_ms)?;

    if raf.over_budget > 0 {
        writeln!(
            f,
            "\n[!] RAF callbacks exceeding {}ms budget: {} ({:.1}%)",
            RAF_BUDGET_MS,
            raf.over_budget,
            percentage(raf.over_budget as f64, raf.callbacks as f64)
        )?;
        for (label, count) in &raf.distribution {
            writeln!(f, "    {}: {}", label, count)?;
        }
    }
    Ok(())
}

fn render_sockets(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    section(f, "8. WEBSOCKET EVENTS", WIDTH)?;

    let sockets = &agg.sockets;
    if sockets.is_empty() {
        return writeln!(f, "  No WebSocket events recorded (may be in different category)");
    }

    writeln!(f, "\nWebSocket events: {}", sockets.events.count)?;
    for (name, stats) in sockets.by_name.sorted_by_count_desc() {
        writeln!(
            f,
            "  {} count={:>5}, total={:>8.1}ms",
            pad(name, 30),
            stats.count,
            ms(stats.total_duration)
        )?;
    }
    Ok(())
}

fn render_memory(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    section(f, "9. MEMORY ANALYSIS", WIDTH)?;

    if agg.memory.is_empty() {
        return writeln!(f, "  No memory snapshots recorded");
    }
    let Some(memory) = MemoryStats::from_samples(&agg.memory) else {
        return writeln!(f, "  No valid memory snapshots");
    };

    writeln!(f, "\nJS Heap Size:")?;
    writeln!(f, "  Min: {:.1} MB", memory.heap_min_mb)?;
    writeln!(f, "  Max: {:.1} MB", memory.heap_max_mb)?;
    writeln!(f, "  Avg: {:.1} MB", memory.heap_avg_mb)?;
    writeln!(f, "  Growth: {:.1} MB", memory.heap_growth_mb())?;

    if memory.is_potential_leak() {
        writeln!(
            f,
            "\n[!] POTENTIAL MEMORY LEAK: Heap grew by {:.1} MB",
            memory.heap_growth_mb()
        )?;
    }

    if let (true, Some(nodes)) = (memory.nodes_in_first_sample, memory.nodes) {
        writeln!(f, "\nDOM Nodes:")?;
        writeln!(f, "  Min: {}", format_count(nodes.min))?;
        writeln!(f, "  Max: {}", format_count(nodes.max))?;
        if let Some(growth) = memory.node_growth_advisory() {
            writeln!(f, "  [!] DOM node count increased by {}", format_count(growth))?;
        }
    }

    if let (true, Some(listeners)) = (memory.listeners_in_first_sample, memory.listeners) {
        writeln!(f, "\nJS Event Listeners:")?;
        writeln!(f, "  Min: {}", format_count(listeners.min))?;
        writeln!(f, "  Max: {}", format_count(listeners.max))?;
        if let Some(growth) = memory.listener_growth_advisory() {
            writeln!(
                f,
                "  [!] Event listener count increased by {}",
                format_count(growth)
            )?;
        }
    }
    Ok(())
}

fn render_frame_rate(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    section(f, "10. FRAME RATE ANALYSIS", WIDTH)?;

    let Some(frames) = FrameStats::from_timestamps(&agg.frame_timestamps) else {
        return writeln!(f, "  Insufficient frame data");
    };

    writeln!(f, "\nFrame count: {}", frames.frame_count)?;
    writeln!(f, "Average frame time: {:.2}ms", frames.avg_frame_ms)?;
    writeln!(f, "Estimated FPS: {:.1}", frames.fps)?;

    if frames.dropped > 0 {
        writeln!(
            f,
            "\n[!] Dropped frames (>{}ms): {} ({:.1}%)",
            DROPPED_FRAME_MS,
            frames.dropped,
            percentage(frames.dropped as f64, frames.deltas as f64)
        )?;
    }
    if frames.jank > 0 {
        writeln!(
            f,
            "[!] Jank frames (>{}ms): {} ({:.1}%)",
            JANK_FRAME_MS,
            frames.jank,
            percentage(frames.jank as f64, frames.deltas as f64)
        )?;
    }
    Ok(())
}

fn render_summary(f: &mut fmt::Formatter<'_>, agg: &TraceAggregates) -> fmt::Result {
    section(f, "SUMMARY & RECOMMENDATIONS", WIDTH)?;
    writeln!(f)?;

    let issues = summarize_issues(agg);
    if issues.is_empty() {
        writeln!(f, "[OK] No major performance issues detected")?;
    } else {
        writeln!(f, "Issues detected:\n")?;
        for issue in &issues {
            writeln!(f, "  {}", issue)?;
        }
    }

    writeln!(f)?;
    crate::text::rule(f, WIDTH)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
