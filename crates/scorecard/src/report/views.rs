use serde::Serialize;

use crate::scoring::{CategoryScore, MetricScore, OverallScore, TrafficLightStatus};

/// Longest string accepted verbatim from config-supplied names before the
/// renderer truncates.
const MAX_DISPLAY_LEN: usize = 1000;

/// Strip control characters and cap the length of config-supplied text.
/// Category and metric names come from user-edited YAML and go straight to
/// terminals and JSON consumers.
pub(super) fn sanitize(input: &str) -> String {
    let cleaned: String = input.chars().filter(|c| !c.is_control()).collect();
    if cleaned.len() > MAX_DISPLAY_LEN {
        let mut end = MAX_DISPLAY_LEN;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &cleaned[..end])
    } else {
        cleaned
    }
}

#[derive(Debug, Serialize)]
pub(super) struct MetricView {
    pub reference: String,
    pub score: i64,
    pub status: TrafficLightStatus,
}

impl MetricView {
    pub fn from_score(metric: &MetricScore) -> Self {
        Self {
            reference: sanitize(&metric.reference),
            score: metric.score,
            status: metric.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CategoryView {
    pub id: String,
    pub name: String,
    pub weight_percent: i64,
    pub score: i64,
    pub kpi_score: i64,
    pub kri_score: i64,
    pub status: TrafficLightStatus,
    pub kpi_status: TrafficLightStatus,
    pub kri_status: TrafficLightStatus,
    pub metrics: Vec<MetricView>,
}

impl CategoryView {
    pub fn from_score(category: &CategoryScore, weight_percent: i64) -> Self {
        Self {
            id: sanitize(&category.id),
            name: sanitize(&category.name),
            weight_percent,
            score: category.score,
            kpi_score: category.kpi_score,
            kri_score: category.kri_score,
            status: category.status,
            kpi_status: category.kpi_status,
            kri_status: category.kri_status,
            metrics: category.metrics.iter().map(MetricView::from_score).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct OverallReportView {
    pub report_date: String,
    pub score: i64,
    pub kpi_score: i64,
    pub kri_score: i64,
    pub status: TrafficLightStatus,
    pub kpi_status: TrafficLightStatus,
    pub kri_status: TrafficLightStatus,
    pub categories: Vec<CategoryView>,
}

#[derive(Debug, Serialize)]
pub(super) struct CategoryReportView {
    pub report_date: String,
    pub category_id: String,
    pub category_name: String,
    pub weight_percent: i64,
    pub score: i64,
    pub kpi_score: i64,
    pub kri_score: i64,
    pub status: TrafficLightStatus,
    pub kpi_status: TrafficLightStatus,
    pub kri_status: TrafficLightStatus,
    pub metrics: Vec<MetricView>,
}

impl OverallReportView {
    pub fn new(report_date: String, score: &OverallScore, categories: Vec<CategoryView>) -> Self {
        Self {
            report_date,
            score: score.score,
            kpi_score: score.kpi_score,
            kri_score: score.kri_score,
            status: score.status,
            kpi_status: score.kpi_status,
            kri_status: score.kri_status,
            categories,
        }
    }
}

impl CategoryReportView {
    pub fn new(report_date: String, score: &CategoryScore, weight_percent: i64) -> Self {
        Self {
            report_date,
            category_id: sanitize(&score.id),
            category_name: sanitize(&score.name),
            weight_percent,
            score: score.score,
            kpi_score: score.kpi_score,
            kri_score: score.kri_score,
            status: score.status,
            kpi_status: score.kpi_status,
            kri_status: score.kri_status,
            metrics: score.metrics.iter().map(MetricView::from_score).collect(),
        }
    }
}
