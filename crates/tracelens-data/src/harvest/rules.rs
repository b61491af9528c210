//! Anomaly rules for harvest events in the inspected tier.

use tracelens_core::thresholds::{category_tier, INSPECTED_TIER};

use super::HarvestEntry;

/// A correctness rule a harvest event can violate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnomalyRule {
    /// The category is bound to a different tier than the event reports.
    WrongCategory {
        category: String,
        tier: i64,
    },
    /// A living resource reported with `size == 0`.
    LivingZeroSize,
}

impl AnomalyRule {
    /// The label anomalies are grouped under.
    pub fn label(&self) -> String {
        match self {
            AnomalyRule::WrongCategory { category, tier } => {
                format!("Wrong category ({} for T{})", category, tier)
            }
            AnomalyRule::LivingZeroSize => "Living resource with size=0".to_string(),
        }
    }
}

/// Rules `entry` violates, in evaluation order.
///
/// Only events of the inspected tier are checked; every other tier yields
/// an empty list.
pub fn violated_rules(entry: &HarvestEntry, tier: i64) -> Vec<AnomalyRule> {
    let mut violated = Vec::new();
    if tier != INSPECTED_TIER {
        return violated;
    }

    if let Some(expected) = category_tier(&entry.category) {
        if expected != tier {
            violated.push(AnomalyRule::WrongCategory {
                category: entry.category.clone(),
                tier,
            });
        }
    }

    if entry.is_living() && entry.data.size == 0 {
        violated.push(AnomalyRule::LivingZeroSize);
    }

    violated
}
