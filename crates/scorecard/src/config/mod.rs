//! Executive levers: traffic-light thresholds and category weights.
//!
//! Loaded from `levers.yaml` and passed read-only into the scoring engine.
//! Weights live in `[0, 1]` but are not forced to sum to 1 here; that check
//! belongs to the `validate weights` CLI command.

mod loader;

pub use loader::{ConfigLoader, ConfigError};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Inclusive score range on the 0-100 axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub min: i64,
    pub max: i64,
}

impl ThresholdRange {
    pub fn contains(&self, score: i64) -> bool {
        score >= self.min && score <= self.max
    }
}

/// Green/Yellow/Red classification ranges. Expected to partition 0..=100 but
/// not enforced at this level; Red acts as the fallback during
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub green: ThresholdRange,
    pub yellow: ThresholdRange,
    pub red: ThresholdRange,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            green: ThresholdRange { min: 80, max: 100 },
            yellow: ThresholdRange { min: 60, max: 79 },
            red: ThresholdRange { min: 0, max: 59 },
        }
    }
}

/// Weight per category id, in `[0, 1]`. Missing entries fall back to an
/// equal share during overall aggregation.
pub type CategoryWeights = BTreeMap<String, f64>;

/// Per-category threshold overrides keyed by category id.
pub type CategoryThresholds = BTreeMap<String, Thresholds>;

/// Organization-wide thresholds for the overall score and for the KPI-only
/// and KRI-only sub-scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalLevers {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub kpi_thresholds: Thresholds,
    #[serde(default)]
    pub kri_thresholds: Thresholds,
}

/// Category weighting plus category-specific threshold overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightLevers {
    #[serde(default)]
    pub categories: CategoryWeights,
    #[serde(default)]
    pub category_thresholds: CategoryThresholds,
    #[serde(default)]
    pub category_kpi_thresholds: CategoryThresholds,
    #[serde(default)]
    pub category_kri_thresholds: CategoryThresholds,
}

/// Top-level levers document (`levers.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeversConfig {
    #[serde(default)]
    pub global: GlobalLevers,
    #[serde(default)]
    pub weights: WeightLevers,
}
