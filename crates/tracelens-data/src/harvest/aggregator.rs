//! Single-pass aggregation of harvest events.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;

use super::rules::violated_rules;
use super::HarvestEntry;
use crate::bucket::BucketMap;

// ── Records ───────────────────────────────────────────────────────────────────

/// The fields of a tiered harvest event kept for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: Option<String>,
    pub category: String,
    pub event: String,
    pub id: Option<i64>,
    pub resource_type: String,
    pub size: i64,
    pub enchant: i64,
    pub is_living: bool,
}

impl Observation {
    fn of(entry: &HarvestEntry) -> Self {
        Self {
            timestamp: entry.timestamp.clone(),
            category: entry.category.clone(),
            event: entry.event.clone(),
            id: entry.data.id,
            resource_type: entry.data.resource_type.clone(),
            size: entry.data.size,
            enchant: entry.data.enchant,
            is_living: entry.is_living(),
        }
    }
}

/// A flagged event together with the rule it broke.
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub rule: String,
    pub observation: Observation,
}

/// Living and static detection counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LivenessCounts {
    pub living: u64,
    pub static_count: u64,
}

impl LivenessCounts {
    fn add(&mut self, is_living: bool) {
        if is_living {
            self.living += 1;
        } else {
            self.static_count += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.living + self.static_count
    }
}

/// Counts and observations for one tier.
#[derive(Debug, Clone, Default)]
pub struct TierStats {
    pub counts: LivenessCounts,
    /// Every tiered event in log order.
    pub observations: Vec<Observation>,
}

/// Composite `(tier, resource type)` key, displayed as `T6 Hide`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    pub tier: i64,
    pub resource_type: String,
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{} {}", self.tier, self.resource_type)
    }
}

// ── HarvestAggregates ─────────────────────────────────────────────────────────

/// Read-only result of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct HarvestAggregates {
    /// Every successfully parsed line.
    pub total_events: u64,
    /// Lines whose category marks a harvest event.
    pub harvest_events: u64,
    /// Harvest events per category, in first-seen order.
    pub by_category: BucketMap,
    /// Ascending by tier.
    pub by_tier: BTreeMap<i64, TierStats>,
    /// Ascending by tier, then resource type.
    pub by_type: BTreeMap<ResourceKey, LivenessCounts>,
    /// Anomalies grouped by rule label, rules in first-seen order.
    pub anomalies: IndexMap<String, Vec<Anomaly>>,
}

impl HarvestAggregates {
    pub fn anomaly_count(&self) -> usize {
        self.anomalies.values().map(Vec::len).sum()
    }
}

// ── HarvestAggregator ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct HarvestAggregator {
    aggregates: HarvestAggregates,
}

impl HarvestAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate every entry in order.
    pub fn run<'a>(entries: impl IntoIterator<Item = &'a HarvestEntry>) -> HarvestAggregates {
        let mut aggregator = Self::new();
        for entry in entries {
            aggregator.record(entry);
        }
        aggregator.into_snapshot()
    }

    /// Count one entry and, when it is a tiered harvest event, classify it.
    pub fn record(&mut self, entry: &HarvestEntry) {
        let agg = &mut self.aggregates;
        agg.total_events += 1;

        if !entry.is_harvest() {
            return;
        }
        agg.harvest_events += 1;
        agg.by_category.record(&entry.category, 0.0, ());

        let Some(tier) = entry.data.tier else {
            return;
        };

        let observation = Observation::of(entry);
        let is_living = observation.is_living;

        let tier_stats = agg.by_tier.entry(tier).or_default();
        tier_stats.counts.add(is_living);
        tier_stats.observations.push(observation.clone());

        agg.by_type
            .entry(ResourceKey {
                tier,
                resource_type: entry.data.resource_type.clone(),
            })
            .or_default()
            .add(is_living);

        for rule in violated_rules(entry, tier) {
            agg.anomalies
                .entry(rule.label())
                .or_default()
                .push(Anomaly {
                    rule: rule.label(),
                    observation: observation.clone(),
                });
        }
    }

    pub fn snapshot(&self) -> &HarvestAggregates {
        &self.aggregates
    }

    pub fn into_snapshot(self) -> HarvestAggregates {
        self.aggregates
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
