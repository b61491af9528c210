//! Severity-tagged punch list re-derived from the aggregated trace.

use std::fmt;

use tracelens_core::formatting::{format_count, micros_to_ms};
use tracelens_core::thresholds::{
    RAF_BUDGET_MS, SUMMARY_GC_TOTAL_MS, SUMMARY_LAYOUT_COUNT, SUMMARY_LONG_RAF_RATIO,
    SUMMARY_LONG_TASK_COUNT,
};

use super::aggregator::TraceAggregates;
use super::stats::{MemoryStats, RafStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Med,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => f.write_str("[HIGH]"),
            Severity::Med => f.write_str("[MED]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    fn high(message: String) -> Self {
        Self {
            severity: Severity::High,
            message,
        }
    }

    fn med(message: String) -> Self {
        Self {
            severity: Severity::Med,
            message,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity, self.message)
    }
}

/// Re-run the summary subset of the threshold checks.
///
/// Independent of the per-section advisories: the section output and this
/// list may flag the same condition at different thresholds.
pub fn summarize_issues(agg: &TraceAggregates) -> Vec<Issue> {
    let mut issues = Vec::new();

    let long_tasks = agg.long_tasks.events.records.len();
    if long_tasks > SUMMARY_LONG_TASK_COUNT {
        issues.push(Issue::high(format!(
            "{} long tasks detected - main thread is frequently blocked",
            long_tasks
        )));
    }

    let gc_ms = micros_to_ms(agg.gc.events.total_duration);
    if !agg.gc.is_empty() && gc_ms > SUMMARY_GC_TOTAL_MS {
        issues.push(Issue::med(format!(
            "{:.0}ms spent in GC - consider reducing allocations",
            gc_ms
        )));
    }

    let layouts = agg.layout.events.records.len();
    if layouts > SUMMARY_LAYOUT_COUNT {
        issues.push(Issue::med(format!(
            "{} layout events - watch for layout thrashing",
            layouts
        )));
    }

    if let Some(raf) = RafStats::from_bucket(&agg.animation_frames) {
        let ratio = raf.over_budget_ratio();
        if ratio > SUMMARY_LONG_RAF_RATIO {
            issues.push(Issue::high(format!(
                "{:.0}% of RAF callbacks exceed {}ms budget",
                ratio * 100.0,
                RAF_BUDGET_MS
            )));
        }
    }

    if let Some(memory) = MemoryStats::from_samples(&agg.memory) {
        if memory.is_potential_leak() {
            issues.push(Issue::high(format!(
                "Memory grew by {:.0}MB - potential memory leak",
                memory.heap_growth_mb()
            )));
        }
        if let Some(growth) = memory.node_growth_issue() {
            issues.push(Issue::high(format!(
                "DOM nodes increased by {} - potential leak",
                format_count(growth)
            )));
        }
        if let Some(growth) = memory.listener_growth_issue() {
            issues.push(Issue::high(format!(
                "Event listeners increased by {} - potential leak",
                format_count(growth)
            )));
        }
    }

    issues
}
