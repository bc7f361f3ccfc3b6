use serde::{Deserialize, Serialize};

/// Traffic-light classification of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLightStatus {
    Green,
    Yellow,
    Red,
}

impl TrafficLightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficLightStatus::Green => "green",
            TrafficLightStatus::Yellow => "yellow",
            TrafficLightStatus::Red => "red",
        }
    }
}

/// Computed score for a single metric observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricScore {
    pub reference: String,
    pub score: i64,
    pub status: TrafficLightStatus,
}

/// Aggregated score for one category, including the KPI-only and KRI-only
/// sub-scores. Rebuilt fresh on every query; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub id: String,
    pub name: String,
    pub score: i64,
    pub kpi_score: i64,
    pub kri_score: i64,
    pub status: TrafficLightStatus,
    pub kpi_status: TrafficLightStatus,
    pub kri_status: TrafficLightStatus,
    pub metrics: Vec<MetricScore>,
}

/// Aggregated score across all categories with recorded metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallScore {
    pub score: i64,
    pub kpi_score: i64,
    pub kri_score: i64,
    pub status: TrafficLightStatus,
    pub kpi_status: TrafficLightStatus,
    pub kri_status: TrafficLightStatus,
    pub categories: Vec<CategoryScore>,
}
