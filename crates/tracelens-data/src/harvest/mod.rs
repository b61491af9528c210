//! Harvest event log records and analysis.
//!
//! The game client writes one JSON object per line with `category`, `event`,
//! `timestamp` and a nested `data` object describing the detected resource.

pub mod aggregator;
pub mod rules;

use serde_json::Value;
use tracelens_core::thresholds::{self, HARVEST_CATEGORY_MARKER, UNKNOWN_RESOURCE_TYPE};

use crate::fields::{i64_field, opt_str_field, str_field};

pub use aggregator::{
    Anomaly, HarvestAggregates, HarvestAggregator, LivenessCounts, Observation, ResourceKey,
    TierStats,
};

// ── HarvestData ───────────────────────────────────────────────────────────────

/// The nested `data` object of a harvest log line.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestData {
    /// Resource tier; events without one are left out of tier statistics.
    pub tier: Option<i64>,
    pub mobile_type_id: Option<i64>,
    /// `stringType`, defaulting to `"Unknown"`.
    pub resource_type: String,
    pub id: Option<i64>,
    pub size: i64,
    pub enchant: i64,
}

impl Default for HarvestData {
    fn default() -> Self {
        Self {
            tier: None,
            mobile_type_id: None,
            resource_type: UNKNOWN_RESOURCE_TYPE.to_string(),
            id: None,
            size: 0,
            enchant: 0,
        }
    }
}

impl HarvestData {
    fn from_value(value: &Value) -> Self {
        Self {
            tier: i64_field(value, "tier"),
            mobile_type_id: i64_field(value, "mobileTypeId"),
            resource_type: opt_str_field(value, "stringType")
                .unwrap_or_else(|| UNKNOWN_RESOURCE_TYPE.to_string()),
            id: i64_field(value, "id"),
            size: i64_field(value, "size").unwrap_or(0),
            enchant: i64_field(value, "enchant").unwrap_or(0),
        }
    }
}

// ── HarvestEntry ──────────────────────────────────────────────────────────────

/// One parsed log line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestEntry {
    pub category: String,
    pub event: String,
    /// Timestamp as written by the client, if any.
    pub timestamp: Option<String>,
    pub data: HarvestData,
}

impl HarvestEntry {
    /// Build an entry from a parsed line. Returns `None` for JSON values that
    /// are not objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let timestamp = match value.get("timestamp") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        Some(Self {
            category: str_field(value, "category"),
            event: str_field(value, "event"),
            timestamp,
            data: value
                .get("data")
                .map(HarvestData::from_value)
                .unwrap_or_default(),
        })
    }

    /// Whether the category marks a harvest event.
    pub fn is_harvest(&self) -> bool {
        self.category.contains(HARVEST_CATEGORY_MARKER)
    }

    /// Living iff the sentinel mobile type id is present.
    pub fn is_living(&self) -> bool {
        thresholds::is_living(self.data.mobile_type_id)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
