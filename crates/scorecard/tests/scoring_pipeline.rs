//! End-to-end scoring: catalog plus levers through metric, category, and
//! overall aggregation.

use chrono::Utc;
use scorecard::catalog::{
    Category, Kpi, Kri, Metric, MetricCatalog, MetricsConfig, MetricsData, ScoringBand,
};
use scorecard::config::{LeversConfig, ThresholdRange, Thresholds};
use scorecard::scoring::{ScoreCalculator, ScoreError, ScoringMethod, TrafficLightStatus};

fn band(min: Option<f64>, max: Option<f64>, score: i64) -> ScoringBand {
    ScoringBand { min, max, score }
}

fn thresholds(green: (i64, i64), yellow: (i64, i64), red: (i64, i64)) -> Thresholds {
    Thresholds {
        green: ThresholdRange {
            min: green.0,
            max: green.1,
        },
        yellow: ThresholdRange {
            min: yellow.0,
            max: yellow.1,
        },
        red: ThresholdRange {
            min: red.0,
            max: red.1,
        },
    }
}

fn observation(reference: &str, value: f64) -> Metric {
    Metric {
        reference: reference.to_string(),
        value,
        timestamp: Utc::now(),
        source_file: String::new(),
    }
}

fn posture_kpi() -> Kpi {
    Kpi {
        id: "remediation_time".to_string(),
        name: "Remediation Time".to_string(),
        description: String::new(),
        unit: "days".to_string(),
        target: 10.0,
        scoring_bands: vec![
            band(None, Some(5.0), 95),
            band(Some(5.0), Some(10.0), 85),
            band(Some(10.0), Some(15.0), 75),
            band(Some(15.0), Some(20.0), 65),
            band(Some(20.0), None, 30),
        ],
    }
}

fn posture_kri() -> Kri {
    Kri {
        id: "open_criticals".to_string(),
        name: "Open Criticals".to_string(),
        description: String::new(),
        unit: "count".to_string(),
        threshold: 5.0,
        scoring_bands: vec![
            band(None, Some(0.0), 95),
            band(Some(0.0), Some(2.0), 85),
            band(Some(2.0), Some(5.0), 75),
            band(Some(5.0), Some(10.0), 65),
            band(Some(10.0), None, 30),
        ],
    }
}

fn coverage_kpi() -> Kpi {
    Kpi {
        id: "coverage".to_string(),
        name: "Coverage".to_string(),
        description: String::new(),
        unit: "percent".to_string(),
        target: 95.0,
        scoring_bands: vec![
            band(Some(95.0), None, 95),
            band(Some(90.0), Some(95.0), 85),
            band(Some(85.0), Some(90.0), 75),
            band(Some(80.0), Some(85.0), 65),
            band(None, Some(80.0), 30),
        ],
    }
}

fn sample_catalog() -> MetricCatalog {
    let config = MetricsConfig {
        categories: vec![
            Category {
                id: "posture".to_string(),
                name: "Posture".to_string(),
                description: String::new(),
                kpis: vec![posture_kpi()],
                kris: vec![posture_kri()],
            },
            Category {
                id: "coverage".to_string(),
                name: "Coverage".to_string(),
                description: String::new(),
                kpis: vec![coverage_kpi()],
                kris: vec![],
            },
        ],
    };
    let data = MetricsData {
        metrics: vec![
            observation("posture.KPI.remediation_time", 3.0),
            observation("posture.KRI.open_criticals", 4.0),
            observation("coverage.KPI.coverage", 92.0),
        ],
    };
    MetricCatalog::new(config, data)
}

fn sample_levers() -> LeversConfig {
    let mut levers = LeversConfig::default();
    levers.global.thresholds = thresholds((80, 100), (60, 79), (0, 59));
    levers.global.kpi_thresholds = thresholds((85, 100), (65, 84), (0, 64));
    levers.global.kri_thresholds = thresholds((75, 100), (55, 74), (0, 54));
    levers.weights.categories.insert("posture".to_string(), 0.6);
    levers.weights.categories.insert("coverage".to_string(), 0.4);
    levers
        .weights
        .category_thresholds
        .insert("coverage".to_string(), thresholds((85, 100), (70, 84), (0, 69)));
    levers
        .weights
        .category_kpi_thresholds
        .insert("coverage".to_string(), thresholds((90, 100), (75, 89), (0, 74)));
    levers
}

#[test]
fn metric_scores_use_type_specific_thresholds() {
    let catalog = sample_catalog();
    let levers = sample_levers();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);

    let kpi = calculator
        .metric_score(&observation("posture.KPI.remediation_time", 3.0))
        .expect("scores");
    assert_eq!(kpi.score, 95);
    assert_eq!(kpi.status, TrafficLightStatus::Green);

    // 75 is Green for a KRI (floor 75) but would be Yellow for a KPI.
    let kri = calculator
        .metric_score(&observation("posture.KRI.open_criticals", 4.0))
        .expect("scores");
    assert_eq!(kri.score, 75);
    assert_eq!(kri.status, TrafficLightStatus::Green);
}

#[test]
fn category_score_combines_kpis_and_kris() {
    let catalog = sample_catalog();
    let levers = sample_levers();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);

    let category = calculator.category_score("posture").expect("scores");
    assert_eq!(category.score, 85);
    assert_eq!(category.kpi_score, 95);
    assert_eq!(category.kri_score, 75);
    assert_eq!(category.status, TrafficLightStatus::Green);
    assert_eq!(category.kpi_status, TrafficLightStatus::Green);
    assert_eq!(category.kri_status, TrafficLightStatus::Green);
    assert_eq!(category.metrics.len(), 2);
}

#[test]
fn category_overrides_replace_global_thresholds() {
    let catalog = sample_catalog();
    let levers = sample_levers();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);

    let category = calculator.category_score("coverage").expect("scores");
    assert_eq!(category.score, 85);
    // Override green floor is 85, so the combined score is Green.
    assert_eq!(category.status, TrafficLightStatus::Green);
    // KPI override raises the green floor to 90; 85 lands in Yellow.
    assert_eq!(category.kpi_status, TrafficLightStatus::Yellow);
    // No KRIs defined: neutral sub-score reported as caution.
    assert_eq!(category.kri_score, 0);
    assert_eq!(category.kri_status, TrafficLightStatus::Yellow);
}

#[test]
fn overall_median_uses_weighted_median_and_normalized_sub_scores() {
    let catalog = sample_catalog();
    let levers = sample_levers();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);

    let overall = calculator.overall_score().expect("scores");
    assert_eq!(overall.score, 85);
    // (95 * 0.6 + 85 * 0.4) / 1.0 = 91.
    assert_eq!(overall.kpi_score, 91);
    // Only the posture category contributes KRIs; normalization cancels its
    // weight.
    assert_eq!(overall.kri_score, 75);
    assert_eq!(overall.status, TrafficLightStatus::Green);
    assert_eq!(overall.kpi_status, TrafficLightStatus::Green);
    assert_eq!(overall.kri_status, TrafficLightStatus::Green);
    assert_eq!(overall.categories.len(), 2);
}

#[test]
fn overall_average_weights_category_scores() {
    let catalog = sample_catalog();
    let levers = sample_levers();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Average);

    let category = calculator.category_score("posture").expect("scores");
    assert_eq!(category.score, 85);

    let overall = calculator.overall_score().expect("scores");
    assert_eq!(overall.score, 85);
}

#[test]
fn aggregation_is_idempotent() {
    let catalog = sample_catalog();
    let levers = sample_levers();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);

    let first = calculator.overall_score().expect("scores");
    let second = calculator.overall_score().expect("scores");
    assert_eq!(first, second);
}

#[test]
fn categories_without_data_are_skipped_in_overall() {
    let mut catalog = sample_catalog();
    let levers = sample_levers();

    // A third category exists in config but has no observations.
    let config = MetricsConfig {
        categories: vec![
            Category {
                id: "posture".to_string(),
                name: "Posture".to_string(),
                description: String::new(),
                kpis: vec![posture_kpi()],
                kris: vec![posture_kri()],
            },
            Category {
                id: "coverage".to_string(),
                name: "Coverage".to_string(),
                description: String::new(),
                kpis: vec![coverage_kpi()],
                kris: vec![],
            },
            Category {
                id: "dormant".to_string(),
                name: "Dormant".to_string(),
                description: String::new(),
                kpis: vec![],
                kris: vec![],
            },
        ],
    };
    catalog = MetricCatalog::new(config, catalog.data().clone());

    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);
    let overall = calculator.overall_score().expect("scores");
    assert_eq!(overall.categories.len(), 2);

    // Asking for the empty category directly is an error.
    assert!(matches!(
        calculator.category_score("dormant"),
        Err(ScoreError::NoMetrics(_))
    ));
}

#[test]
fn no_category_with_data_is_fatal() {
    let catalog = MetricCatalog::new(
        MetricsConfig {
            categories: vec![Category {
                id: "empty".to_string(),
                name: "Empty".to_string(),
                description: String::new(),
                kpis: vec![],
                kris: vec![],
            }],
        },
        MetricsData::default(),
    );
    let levers = LeversConfig::default();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);

    assert!(matches!(
        calculator.overall_score(),
        Err(ScoreError::NoCategoriesWithMetrics)
    ));
}

#[test]
fn default_weight_shares_by_total_category_count() {
    // Three configured categories, data in two, weight configured for one.
    // The unweighted category falls back to 1/3, not 1/2, so the normalized
    // average is (80 * 0.5 + 100 / 3) / (0.5 + 1/3) = 88.
    let config = MetricsConfig {
        categories: vec![
            Category {
                id: "a".to_string(),
                name: "A".to_string(),
                description: String::new(),
                kpis: vec![Kpi {
                    id: "m".to_string(),
                    name: "M".to_string(),
                    description: String::new(),
                    unit: String::new(),
                    target: 0.0,
                    scoring_bands: vec![band(None, None, 80)],
                }],
                kris: vec![],
            },
            Category {
                id: "b".to_string(),
                name: "B".to_string(),
                description: String::new(),
                kpis: vec![Kpi {
                    id: "m".to_string(),
                    name: "M".to_string(),
                    description: String::new(),
                    unit: String::new(),
                    target: 0.0,
                    scoring_bands: vec![band(None, None, 100)],
                }],
                kris: vec![],
            },
            Category {
                id: "c".to_string(),
                name: "C".to_string(),
                description: String::new(),
                kpis: vec![],
                kris: vec![],
            },
        ],
    };
    let data = MetricsData {
        metrics: vec![observation("a.KPI.m", 1.0), observation("b.KPI.m", 1.0)],
    };
    let catalog = MetricCatalog::new(config, data);

    let mut levers = LeversConfig::default();
    levers.weights.categories.insert("a".to_string(), 0.5);

    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Average);
    let overall = calculator.overall_score().expect("scores");
    assert_eq!(overall.score, 88);
}

#[test]
fn remediation_scenario_lands_in_the_sixty_five_band() {
    let config = MetricsConfig {
        categories: vec![Category {
            id: "app_sec".to_string(),
            name: "Application Security".to_string(),
            description: String::new(),
            kpis: vec![Kpi {
                id: "vuln_remediation_time".to_string(),
                name: "Vulnerability Remediation Time".to_string(),
                description: String::new(),
                unit: "days".to_string(),
                target: 30.0,
                scoring_bands: vec![
                    band(None, Some(15.0), 95),
                    band(Some(15.0), Some(30.0), 85),
                    band(Some(30.0), Some(40.0), 75),
                    band(Some(40.0), Some(60.0), 65),
                    band(Some(60.0), None, 30),
                ],
            }],
            kris: vec![],
        }],
    };
    let data = MetricsData {
        metrics: vec![observation("app_sec.KPI.vuln_remediation_time", 45.0)],
    };
    let catalog = MetricCatalog::new(config, data);
    let levers = LeversConfig::default();
    let calculator = ScoreCalculator::new(&catalog, &levers, ScoringMethod::Median);

    let metric = calculator
        .metric_score(&observation("app_sec.KPI.vuln_remediation_time", 45.0))
        .expect("scores");
    assert_eq!(metric.score, 65);
    assert_eq!(metric.status, TrafficLightStatus::Yellow);
}
