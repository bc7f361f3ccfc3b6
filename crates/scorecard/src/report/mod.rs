//! Report rendering.
//!
//! Formats the scoring engine's output for terminals and machine consumers.
//! The renderer never re-derives scores: it asks the calculator once and
//! formats what it gets.

mod views;

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::Utc;

use crate::scoring::{CategoryScore, MetricScore, OverallScore, ScoreCalculator, ScoreError, TrafficLightStatus};

use views::{sanitize, CategoryReportView, CategoryView, OverallReportView};

/// Failures raised while rendering a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("unsupported report format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to encode report as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Table,
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "table" => Ok(ReportFormat::Table),
            other => Err(ReportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// How traffic-light statuses are rendered in text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    #[default]
    Emoji,
    Text,
}

impl LabelStyle {
    fn label(&self, status: TrafficLightStatus) -> &'static str {
        match (self, status) {
            (LabelStyle::Emoji, TrafficLightStatus::Green) => "\u{1f7e2}",
            (LabelStyle::Emoji, TrafficLightStatus::Yellow) => "\u{1f7e1}",
            (LabelStyle::Emoji, TrafficLightStatus::Red) => "\u{1f534}",
            (LabelStyle::Text, TrafficLightStatus::Green) => "GREEN",
            (LabelStyle::Text, TrafficLightStatus::Yellow) => "YELLOW",
            (LabelStyle::Text, TrafficLightStatus::Red) => "RED",
        }
    }
}

/// Renders overall and per-category reports from one calculator.
pub struct ReportGenerator<'a> {
    calculator: &'a ScoreCalculator<'a>,
    labels: LabelStyle,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(calculator: &'a ScoreCalculator<'a>, labels: LabelStyle) -> Self {
        Self { calculator, labels }
    }

    /// Render the posture report across every category with data.
    pub fn overall_report(&self, format: ReportFormat) -> Result<String, ReportError> {
        let score = self.calculator.overall_score()?;
        match format {
            ReportFormat::Text => Ok(self.overall_as_text(&score)),
            ReportFormat::Table => Ok(self.overall_as_table(&score)),
            ReportFormat::Json => self.overall_as_json(&score),
        }
    }

    /// Render the report for one category.
    pub fn category_report(
        &self,
        category_id: &str,
        format: ReportFormat,
    ) -> Result<String, ReportError> {
        let score = self.calculator.category_score(category_id)?;
        match format {
            ReportFormat::Text => Ok(self.category_as_text(&score)),
            ReportFormat::Table => Ok(self.category_as_table(&score)),
            ReportFormat::Json => self.category_as_json(&score),
        }
    }

    fn weight_percent(&self, category_id: &str) -> i64 {
        (self.calculator.category_weight(category_id) * 100.0) as i64
    }

    fn overall_as_text(&self, score: &OverallScore) -> String {
        let mut out = String::new();

        out.push_str("===== SECURITY POSTURE REPORT =====\n\n");
        let _ = writeln!(
            out,
            "Overall Score: {} ({})",
            score.score,
            self.labels.label(score.status)
        );
        let _ = writeln!(
            out,
            "KPI Score: {} ({})",
            score.kpi_score,
            self.labels.label(score.kpi_status)
        );
        let _ = writeln!(
            out,
            "KRI Score: {} ({})",
            score.kri_score,
            self.labels.label(score.kri_status)
        );
        let _ = writeln!(out, "Report Date: {}\n", report_timestamp());

        out.push_str("Category Scores:\n");
        out.push_str("----------------\n");
        for category in &score.categories {
            let _ = writeln!(
                out,
                "- {} (weight: {}%):",
                sanitize(&category.name),
                self.weight_percent(&category.id)
            );
            let _ = writeln!(
                out,
                "  KPI: {} ({}), KRI: {} ({})",
                category.kpi_score,
                self.labels.label(category.kpi_status),
                category.kri_score,
                self.labels.label(category.kri_status)
            );
        }

        out.push_str("\nDetailed Metrics:\n");
        out.push_str("----------------\n");
        for category in &score.categories {
            let _ = writeln!(out, "\n{}:", sanitize(&category.name));
            for metric in &category.metrics {
                if let Some((kind, id)) = reference_parts(&metric.reference) {
                    let _ = writeln!(
                        out,
                        "  - {} {}: {} ({})",
                        sanitize(kind),
                        sanitize(id),
                        metric.score,
                        self.labels.label(metric.status)
                    );
                }
            }
        }

        out
    }

    fn category_as_text(&self, score: &CategoryScore) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "===== {} REPORT (WEIGHT: {}%) =====\n",
            sanitize(&score.name).to_uppercase(),
            self.weight_percent(&score.id)
        );
        let _ = writeln!(
            out,
            "Score: {} ({})",
            score.score,
            self.labels.label(score.status)
        );
        let _ = writeln!(
            out,
            "KPI Score: {} ({})",
            score.kpi_score,
            self.labels.label(score.kpi_status)
        );
        let _ = writeln!(
            out,
            "KRI Score: {} ({})",
            score.kri_score,
            self.labels.label(score.kri_status)
        );
        let _ = writeln!(out, "Report Date: {}\n", report_timestamp());

        out.push_str("Metrics:\n");
        out.push_str("--------\n");

        let (kpis, kris) = split_by_kind(&score.metrics);

        if !kpis.is_empty() {
            out.push_str("\nKPIs:\n");
            for metric in &kpis {
                if let Some((_, id)) = reference_parts(&metric.reference) {
                    let _ = writeln!(
                        out,
                        "- KPI {}: {} ({})",
                        sanitize(id),
                        metric.score,
                        self.labels.label(metric.status)
                    );
                }
            }
        }

        if !kris.is_empty() {
            out.push_str("\nKRIs:\n");
            for metric in &kris {
                if let Some((_, id)) = reference_parts(&metric.reference) {
                    let _ = writeln!(
                        out,
                        "- KRI {}: {} ({})",
                        sanitize(id),
                        metric.score,
                        self.labels.label(metric.status)
                    );
                }
            }
        }

        out
    }

    fn overall_as_table(&self, score: &OverallScore) -> String {
        let mut out = String::new();

        out.push_str("===== SECURITY POSTURE REPORT =====\n\n");
        let _ = writeln!(
            out,
            "Overall Score: {} ({})",
            score.score,
            self.labels.label(score.status)
        );
        let _ = writeln!(
            out,
            "KPI Score: {} ({})",
            score.kpi_score,
            self.labels.label(score.kpi_status)
        );
        let _ = writeln!(
            out,
            "KRI Score: {} ({})",
            score.kri_score,
            self.labels.label(score.kri_status)
        );
        let _ = writeln!(out, "Report Date: {}\n", report_timestamp());

        out.push_str("CATEGORY SCORES:\n");
        let mut rows = vec![
            row(&["Category", "Weight", "KPI Score", "KPI Status", "KRI Score", "KRI Status"]),
            row(&["--------", "------", "---------", "----------", "---------", "----------"]),
        ];
        for category in &score.categories {
            rows.push(vec![
                sanitize(&category.name),
                format!("{}%", self.weight_percent(&category.id)),
                category.kpi_score.to_string(),
                self.labels.label(category.kpi_status).to_string(),
                category.kri_score.to_string(),
                self.labels.label(category.kri_status).to_string(),
            ]);
        }
        out.push_str(&align_columns(&rows));

        out.push_str("\nDETAILED METRICS:\n");
        let mut rows = vec![
            row(&["Category", "Metric Type", "Metric ID", "Score", "Status"]),
            row(&["--------", "-----------", "---------", "-----", "------"]),
        ];
        for category in &score.categories {
            for metric in &category.metrics {
                if let Some((kind, id)) = reference_parts(&metric.reference) {
                    rows.push(vec![
                        sanitize(&category.name),
                        sanitize(kind),
                        sanitize(id),
                        metric.score.to_string(),
                        self.labels.label(metric.status).to_string(),
                    ]);
                }
            }
        }
        out.push_str(&align_columns(&rows));

        out
    }

    fn category_as_table(&self, score: &CategoryScore) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "===== {} REPORT (WEIGHT: {}%) =====\n",
            sanitize(&score.name).to_uppercase(),
            self.weight_percent(&score.id)
        );
        let _ = writeln!(
            out,
            "Score: {} ({})",
            score.score,
            self.labels.label(score.status)
        );
        let _ = writeln!(
            out,
            "KPI Score: {} ({})",
            score.kpi_score,
            self.labels.label(score.kpi_status)
        );
        let _ = writeln!(
            out,
            "KRI Score: {} ({})",
            score.kri_score,
            self.labels.label(score.kri_status)
        );
        let _ = writeln!(out, "Report Date: {}\n", report_timestamp());

        out.push_str("METRICS:\n");
        let mut rows = vec![
            row(&["Type", "ID", "Score", "Status"]),
            row(&["----", "--", "-----", "------"]),
        ];
        let (kpis, kris) = split_by_kind(&score.metrics);
        for metric in kpis.iter().chain(kris.iter()) {
            if let Some((kind, id)) = reference_parts(&metric.reference) {
                rows.push(vec![
                    sanitize(kind),
                    sanitize(id),
                    metric.score.to_string(),
                    self.labels.label(metric.status).to_string(),
                ]);
            }
        }
        out.push_str(&align_columns(&rows));

        out
    }

    fn overall_as_json(&self, score: &OverallScore) -> Result<String, ReportError> {
        let categories = score
            .categories
            .iter()
            .map(|category| CategoryView::from_score(category, self.weight_percent(&category.id)))
            .collect();
        let view = OverallReportView::new(Utc::now().to_rfc3339(), score, categories);
        Ok(serde_json::to_string_pretty(&view)?)
    }

    fn category_as_json(&self, score: &CategoryScore) -> Result<String, ReportError> {
        let view =
            CategoryReportView::new(Utc::now().to_rfc3339(), score, self.weight_percent(&score.id));
        Ok(serde_json::to_string_pretty(&view)?)
    }
}

fn report_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Split a `category.TYPE.id` reference into its TYPE and id segments.
/// References inside computed scores always carry three segments; anything
/// else is silently dropped from display.
fn reference_parts(reference: &str) -> Option<(&str, &str)> {
    let mut parts = reference.split('.');
    let _category = parts.next()?;
    let kind = parts.next()?;
    let id = parts.next()?;
    match parts.next() {
        None => Some((kind, id)),
        Some(_) => None,
    }
}

fn split_by_kind(metrics: &[MetricScore]) -> (Vec<&MetricScore>, Vec<&MetricScore>) {
    let mut kpis = Vec::new();
    let mut kris = Vec::new();
    for metric in metrics {
        match reference_parts(&metric.reference) {
            Some(("KPI", _)) => kpis.push(metric),
            Some(("KRI", _)) => kris.push(metric),
            _ => {}
        }
    }
    (kpis, kris)
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

/// Pad each column to its widest cell, two spaces between columns.
fn align_columns(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if index + 1 == row.len() {
                out.push_str(cell);
            } else {
                let padding = widths[index] - cell.chars().count();
                out.push_str(cell);
                out.extend(std::iter::repeat(' ').take(padding + 2));
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_accepts_known_names_only() {
        assert_eq!("text".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("table".parse::<ReportFormat>().unwrap(), ReportFormat::Table);

        let err = "pdf".parse::<ReportFormat>().unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedFormat(ref f) if f == "pdf"));
    }

    #[test]
    fn labels_render_per_style() {
        assert_eq!(LabelStyle::Text.label(TrafficLightStatus::Green), "GREEN");
        assert_eq!(LabelStyle::Text.label(TrafficLightStatus::Red), "RED");
        assert_eq!(LabelStyle::Emoji.label(TrafficLightStatus::Yellow), "\u{1f7e1}");
    }

    #[test]
    fn reference_parts_require_three_segments() {
        assert_eq!(
            reference_parts("app_sec.KPI.patch_compliance"),
            Some(("KPI", "patch_compliance"))
        );
        assert_eq!(reference_parts("app_sec.KPI"), None);
        assert_eq!(reference_parts("a.b.c.d"), None);
    }

    #[test]
    fn align_columns_pads_to_widest_cell() {
        let rows = vec![
            row(&["Type", "ID", "Score"]),
            row(&["KPI", "patch_compliance", "85"]),
        ];
        let aligned = align_columns(&rows);
        let lines: Vec<&str> = aligned.lines().collect();
        assert!(lines[0].starts_with("Type  ID"));
        assert!(lines[1].starts_with("KPI   patch_compliance"));
        assert_eq!(lines[0].find("Score"), lines[1].find("85"));
    }
}
