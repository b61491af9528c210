//! Compact JSON digest of a harvest analysis run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracelens_core::{AnalyzerError, Result};
use tracing::debug;

use crate::harvest::HarvestAggregates;

/// Per-tier counts as written to the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDigest {
    pub living: u64,
    #[serde(rename = "static")]
    pub static_count: u64,
    pub total: u64,
}

/// Aggregate counts and the anomaly histogram of one run.
///
/// Field names match the digest files already present in work directories,
/// so downstream comparisons keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestDigest {
    pub total_events: u64,
    pub harvest_events: u64,
    pub by_category: IndexMap<String, u64>,
    pub by_tier: BTreeMap<i64, TierDigest>,
    pub t6_issues_count: usize,
    pub t6_issues_summary: IndexMap<String, usize>,
}

impl HarvestDigest {
    pub fn from_snapshot(agg: &HarvestAggregates) -> Self {
        Self {
            total_events: agg.total_events,
            harvest_events: agg.harvest_events,
            by_category: agg
                .by_category
                .iter()
                .map(|(category, bucket)| (category.to_string(), bucket.count))
                .collect(),
            by_tier: agg
                .by_tier
                .iter()
                .map(|(&tier, stats)| {
                    (
                        tier,
                        TierDigest {
                            living: stats.counts.living,
                            static_count: stats.counts.static_count,
                            total: stats.counts.total(),
                        },
                    )
                })
                .collect(),
            t6_issues_count: agg.anomaly_count(),
            t6_issues_summary: agg
                .anomalies
                .iter()
                .map(|(rule, anomalies)| (rule.clone(), anomalies.len()))
                .collect(),
        }
    }

    /// `harvest_analysis_YYYYmmdd_HHMMSS.json`.
    pub fn file_name(at: NaiveDateTime) -> String {
        format!("harvest_analysis_{}.json", at.format("%Y%m%d_%H%M%S"))
    }

    /// Write the digest as pretty JSON into `dir`, creating it if needed.
    /// Returns the path written.
    pub fn write_to(&self, dir: &Path, at: NaiveDateTime) -> Result<PathBuf> {
        let path = dir.join(Self::file_name(at));
        let write_err = |source| AnalyzerError::FileWrite {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(write_err)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(write_err)?;

        debug!("Digest written to {}", path.display());
        Ok(path)
    }
}
