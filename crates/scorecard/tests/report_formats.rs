//! Report rendering against a small fixed catalog.

use chrono::Utc;
use scorecard::catalog::{
    Category, Kpi, Kri, Metric, MetricCatalog, MetricsConfig, MetricsData, ScoringBand,
};
use scorecard::config::LeversConfig;
use scorecard::report::{LabelStyle, ReportError, ReportFormat, ReportGenerator};
use scorecard::scoring::{ScoreCalculator, ScoringMethod};

fn fixture() -> (MetricCatalog, LeversConfig) {
    let config = MetricsConfig {
        categories: vec![Category {
            id: "app_sec".to_string(),
            name: "Application Security".to_string(),
            description: String::new(),
            kpis: vec![Kpi {
                id: "patch_compliance".to_string(),
                name: "Patch Compliance".to_string(),
                description: String::new(),
                unit: "percent".to_string(),
                target: 95.0,
                scoring_bands: vec![
                    ScoringBand {
                        min: Some(90.0),
                        max: None,
                        score: 95,
                    },
                    ScoringBand {
                        min: None,
                        max: Some(90.0),
                        score: 60,
                    },
                ],
            }],
            kris: vec![Kri {
                id: "open_criticals".to_string(),
                name: "Open Criticals".to_string(),
                description: String::new(),
                unit: "count".to_string(),
                threshold: 5.0,
                scoring_bands: vec![
                    ScoringBand {
                        min: None,
                        max: Some(5.0),
                        score: 85,
                    },
                    ScoringBand {
                        min: Some(5.0),
                        max: None,
                        score: 40,
                    },
                ],
            }],
        }],
    };
    let data = MetricsData {
        metrics: vec![
            Metric {
                reference: "app_sec.KPI.patch_compliance".to_string(),
                value: 97.0,
                timestamp: Utc::now(),
                source_file: String::new(),
            },
            Metric {
                reference: "app_sec.KRI.open_criticals".to_string(),
                value: 2.0,
                timestamp: Utc::now(),
                source_file: String::new(),
            },
        ],
    };
    let mut levers = LeversConfig::default();
    levers.weights.categories.insert("app_sec".to_string(), 1.0);
    (MetricCatalog::new(config, data), levers)
}

#[test]
fn text_report_carries_scores_weights_and_labels() {
    let (catalog, levers) = fixture();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);
    let generator = ReportGenerator::new(&calculator, LabelStyle::Text);

    let report = generator
        .overall_report(ReportFormat::Text)
        .expect("renders");
    assert!(report.contains("===== SECURITY POSTURE REPORT ====="));
    assert!(report.contains("Overall Score: 90 (GREEN)"));
    assert!(report.contains("- Application Security (weight: 100%):"));
    assert!(report.contains("KPI patch_compliance: 95 (GREEN)"));
    assert!(report.contains("KRI open_criticals: 85 (GREEN)"));
}

#[test]
fn category_text_report_groups_by_metric_type() {
    let (catalog, levers) = fixture();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);
    let generator = ReportGenerator::new(&calculator, LabelStyle::Text);

    let report = generator
        .category_report("app_sec", ReportFormat::Text)
        .expect("renders");
    assert!(report.contains("===== APPLICATION SECURITY REPORT (WEIGHT: 100%) ====="));
    let kpis_at = report.find("KPIs:").expect("KPI section");
    let kris_at = report.find("KRIs:").expect("KRI section");
    assert!(kpis_at < kris_at);
}

#[test]
fn json_report_round_trips_through_serde() {
    let (catalog, levers) = fixture();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);
    let generator = ReportGenerator::new(&calculator, LabelStyle::Emoji);

    let report = generator
        .overall_report(ReportFormat::Json)
        .expect("renders");
    let parsed: serde_json::Value = serde_json::from_str(&report).expect("valid JSON");

    assert_eq!(parsed["score"], 90);
    assert_eq!(parsed["kpi_score"], 95);
    assert_eq!(parsed["kri_score"], 85);
    assert_eq!(parsed["status"], "green");
    assert!(parsed["report_date"].is_string());

    let categories = parsed["categories"].as_array().expect("array");
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["id"], "app_sec");
    assert_eq!(categories[0]["weight_percent"], 100);
    assert_eq!(categories[0]["metrics"].as_array().expect("array").len(), 2);
}

#[test]
fn table_report_has_aligned_headers() {
    let (catalog, levers) = fixture();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);
    let generator = ReportGenerator::new(&calculator, LabelStyle::Text);

    let report = generator
        .overall_report(ReportFormat::Table)
        .expect("renders");
    assert!(report.contains("CATEGORY SCORES:"));
    assert!(report.contains("DETAILED METRICS:"));

    let lines: Vec<&str> = report.lines().collect();
    let header = lines
        .iter()
        .find(|line| line.starts_with("Category") && line.contains("Weight"))
        .expect("header row");
    let data_row = lines
        .iter()
        .find(|line| line.starts_with("Application Security") && line.contains("100%"))
        .expect("data row");
    assert_eq!(header.find("Weight"), data_row.find("100%"));
}

#[test]
fn unknown_format_fails_without_output() {
    let err = "pdf".parse::<ReportFormat>().unwrap_err();
    assert!(matches!(err, ReportError::UnsupportedFormat(f) if f == "pdf"));
}
