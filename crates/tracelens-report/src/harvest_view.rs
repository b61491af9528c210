//! Text report for aggregated harvest events.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

use indexmap::IndexMap;
use tracelens_core::formatting::{format_count, percentage};
use tracelens_core::thresholds::{FOCUS_TIERS, INSPECTED_TIER};
use tracelens_data::harvest::{Anomaly, HarvestAggregates, Observation};

use crate::text::{rule, section};

const WIDTH: usize = 80;
const ANOMALY_EXAMPLES: usize = 3;

/// Render the complete harvest report.
pub fn render(agg: &HarvestAggregates) -> String {
    HarvestReport(agg).to_string()
}

pub struct HarvestReport<'a>(pub &'a HarvestAggregates);

impl fmt::Display for HarvestReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let agg = self.0;
        section(f, "HARVEST LOG ANALYSIS REPORT", WIDTH)?;
        render_categories(f, agg)?;
        render_tiers(f, agg)?;
        render_focus_types(f, agg)?;
        render_anomalies(f, agg)?;
        render_inspected_tier(f, agg)?;
        writeln!(f)?;
        rule(f, WIDTH)
    }
}

fn render_categories(f: &mut fmt::Formatter<'_>, agg: &HarvestAggregates) -> fmt::Result {
    writeln!(f, "\nHarvest categories:")?;
    if agg.by_category.is_empty() {
        writeln!(f, "  (none)")?;
    }
    for (category, bucket) in agg.by_category.sorted_by_count_desc() {
        writeln!(f, "  - {}: {} events", category, format_count(bucket.count))?;
    }
    Ok(())
}

fn render_tiers(f: &mut fmt::Formatter<'_>, agg: &HarvestAggregates) -> fmt::Result {
    writeln!(f, "\nStatistics by tier:")?;
    for (tier, stats) in &agg.by_tier {
        let counts = stats.counts;
        let living_pct = percentage(counts.living as f64, counts.total() as f64);
        writeln!(f, "\n  T{}: {} detections", tier, format_count(counts.total()))?;
        writeln!(f, "    Living: {} ({:.1}%)", format_count(counts.living), living_pct)?;
        writeln!(
            f,
            "    Static: {} ({:.1}%)",
            format_count(counts.static_count),
            100.0 - living_pct
        )?;
    }
    Ok(())
}

fn render_focus_types(f: &mut fmt::Formatter<'_>, agg: &HarvestAggregates) -> fmt::Result {
    writeln!(f, "\nStatistics by resource type:")?;
    for (key, counts) in agg
        .by_type
        .iter()
        .filter(|(key, _)| FOCUS_TIERS.contains(&key.tier))
    {
        writeln!(f, "  - {}:", key)?;
        writeln!(
            f,
            "    Living: {} | Static: {} | Total: {}",
            format_count(counts.living),
            format_count(counts.static_count),
            format_count(counts.total())
        )?;
    }
    Ok(())
}

fn render_anomalies(f: &mut fmt::Formatter<'_>, agg: &HarvestAggregates) -> fmt::Result {
    writeln!(f, "\nIssues found for T{}:\n", INSPECTED_TIER)?;
    if agg.anomalies.is_empty() {
        return writeln!(f, "  [OK] No issues detected");
    }

    for (label, anomalies) in &agg.anomalies {
        writeln!(f, "  [!] {}: {} occurrences", label, anomalies.len())?;
        writeln!(f, "    Examples:")?;
        for (i, anomaly) in anomalies.iter().take(ANOMALY_EXAMPLES).enumerate() {
            writeln!(f, "      {}. {}", i + 1, AnomalyLine(anomaly))?;
        }
        if anomalies.len() > ANOMALY_EXAMPLES {
            writeln!(f, "      ... and {} more", anomalies.len() - ANOMALY_EXAMPLES)?;
        }
        writeln!(f)?;
    }
    Ok(())
}

struct AnomalyLine<'a>(&'a Anomaly);

impl Display for AnomalyLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0.observation;
        match o.id {
            Some(id) => write!(f, "ID:{}", id)?,
            None => write!(f, "ID:none")?,
        }
        write!(
            f,
            " | {} | Living:{} | Size:{} | Category:{}",
            o.resource_type, o.is_living, o.size, o.category
        )
    }
}

fn render_inspected_tier(f: &mut fmt::Formatter<'_>, agg: &HarvestAggregates) -> fmt::Result {
    writeln!(f, "\nDetailed T{} analysis:", INSPECTED_TIER)?;
    let Some(stats) = agg.by_tier.get(&INSPECTED_TIER) else {
        return writeln!(f, "  No T{} events recorded", INSPECTED_TIER);
    };

    let mut categories: IndexMap<&str, usize> = IndexMap::new();
    for o in &stats.observations {
        *categories.entry(o.category.as_str()).or_default() += 1;
    }
    // Stable, so equal counts keep first-seen order.
    categories.sort_by(|_, a, _, b| b.cmp(a));

    writeln!(f, "  Categories used for T{}:", INSPECTED_TIER)?;
    for (category, count) in &categories {
        writeln!(f, "    {}: {} events", category, count)?;
    }

    let mut by_type: BTreeMap<&str, (Vec<&Observation>, Vec<&Observation>)> = BTreeMap::new();
    for o in &stats.observations {
        let (living, static_obs) = by_type.entry(o.resource_type.as_str()).or_default();
        if o.is_living {
            living.push(o);
        } else {
            static_obs.push(o);
        }
    }

    writeln!(f, "\n  Detail by T{} resource type:", INSPECTED_TIER)?;
    for (resource_type, (living, static_obs)) in &by_type {
        writeln!(f, "\n    T{} {}:", INSPECTED_TIER, resource_type)?;
        writeln!(f, "      Living: {} detections", living.len())?;
        if !living.is_empty() {
            writeln!(f, "        Sizes: {}", distinct(living.iter().map(|o| o.size)))?;
            writeln!(f, "        Enchants: {}", distinct(living.iter().map(|o| o.enchant)))?;
            writeln!(
                f,
                "        Categories: {}",
                distinct(living.iter().map(|o| o.category.as_str()))
            )?;
        }
        writeln!(f, "      Static: {} detections", static_obs.len())?;
        if !static_obs.is_empty() {
            writeln!(
                f,
                "        Categories: {}",
                distinct(static_obs.iter().map(|o| o.category.as_str()))
            )?;
        }
    }
    Ok(())
}

/// Sorted, de-duplicated values as `{a, b, c}`.
fn distinct<T: Ord + Display>(values: impl Iterator<Item = T>) -> String {
    let set: BTreeSet<T> = values.collect();
    let joined: Vec<String> = set.iter().map(ToString::to_string).collect();
    format!("{{{}}}", joined.join(", "))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
