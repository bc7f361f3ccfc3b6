//! Scoring and aggregation engine.
//!
//! Converts raw metric values into banded scores, aggregates metric scores
//! into category scores, and category scores into an overall score. The
//! engine is purely computational: it borrows an immutable catalog snapshot
//! and levers at construction, holds no cache, and never logs or mutates —
//! repeated queries against the same snapshot return identical results.

mod aggregate;
mod outcome;

pub use outcome::{CategoryScore, MetricScore, OverallScore, TrafficLightStatus};

use crate::catalog::{CatalogError, Metric, MetricCatalog, MetricKind, MetricRef, ScoringBand};
use crate::config::{LeversConfig, Thresholds};

/// Score assigned when a metric definition declares no scoring bands.
/// Deliberately neutral: the metric exists but cannot be graded yet.
pub const NEUTRAL_SCORE: i64 = 50;

/// How a set of scores is combined into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringMethod {
    #[default]
    Median,
    Average,
}

impl ScoringMethod {
    fn combine(&self, scores: &[i64]) -> i64 {
        match self {
            ScoringMethod::Median => aggregate::median(scores),
            ScoringMethod::Average => aggregate::average(scores),
        }
    }

    fn combine_weighted(&self, scores: &[i64], weights: &[f64]) -> i64 {
        match self {
            ScoringMethod::Median => aggregate::weighted_median(scores, weights),
            ScoringMethod::Average => aggregate::weighted_average(scores, weights),
        }
    }
}

/// Failures raised while computing scores.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Expected for categories with no recorded data yet; skipped silently
    /// during overall aggregation, surfaced when a category report is
    /// requested explicitly.
    #[error("no metrics found for category: {0}")]
    NoMetrics(String),
    #[error("no categories with metrics found")]
    NoCategoriesWithMetrics,
}

/// Scan bands in declared order; the first band containing the value wins.
/// Overlapping or out-of-order bands are legal, which is why this is a
/// linear first-match scan and not a sorted-range lookup. A value matching
/// no band takes the last declared band's score: by convention the tail band
/// is unbounded on its missing side, so this covers the open end.
fn band_score(bands: &[ScoringBand], value: f64) -> i64 {
    bands
        .iter()
        .find(|band| band.contains(value))
        .or_else(|| bands.last())
        .map(|band| band.score)
        .unwrap_or(NEUTRAL_SCORE)
}

/// Classify a score: Green range first, then Yellow, with Red as the
/// fallback. The ranges are expected to partition 0..=100 but that is not
/// enforced here.
fn determine_status(score: i64, thresholds: &Thresholds) -> TrafficLightStatus {
    if thresholds.green.contains(score) {
        TrafficLightStatus::Green
    } else if thresholds.yellow.contains(score) {
        TrafficLightStatus::Yellow
    } else {
        TrafficLightStatus::Red
    }
}

/// Scoring engine over one catalog snapshot.
pub struct ScoreCalculator<'a> {
    catalog: &'a MetricCatalog,
    levers: &'a LeversConfig,
    method: ScoringMethod,
}

impl<'a> ScoreCalculator<'a> {
    pub fn new(catalog: &'a MetricCatalog, levers: &'a LeversConfig, method: ScoringMethod) -> Self {
        Self {
            catalog,
            levers,
            method,
        }
    }

    pub fn catalog(&self) -> &MetricCatalog {
        self.catalog
    }

    pub fn levers(&self) -> &LeversConfig {
        self.levers
    }

    /// Weight used for a category during overall aggregation: the configured
    /// weight, or an equal share of the total category count. The
    /// denominator deliberately counts all configured categories, including
    /// ones later skipped for lacking metrics, to match the established
    /// report arithmetic.
    pub fn category_weight(&self, category_id: &str) -> f64 {
        self.levers
            .weights
            .categories
            .get(category_id)
            .copied()
            .unwrap_or_else(|| {
                let total = self.catalog.categories().len();
                if total == 0 {
                    1.0
                } else {
                    1.0 / total as f64
                }
            })
    }

    /// Score a single observation: resolve the reference, find the first
    /// matching band, classify against the KPI- or KRI-specific global
    /// thresholds.
    pub fn metric_score(&self, metric: &Metric) -> Result<MetricScore, ScoreError> {
        let reference: MetricRef = metric.reference.parse::<MetricRef>()?;
        self.score_reference(&reference, metric.value)
    }

    fn score_reference(
        &self,
        reference: &MetricRef,
        value: f64,
    ) -> Result<MetricScore, ScoreError> {
        let definition = self.catalog.metric_definition(reference)?;
        let score = band_score(definition.scoring_bands(), value);
        let thresholds = match definition.kind() {
            MetricKind::Kpi => &self.levers.global.kpi_thresholds,
            MetricKind::Kri => &self.levers.global.kri_thresholds,
        };

        Ok(MetricScore {
            reference: reference.to_string(),
            score,
            status: determine_status(score, thresholds),
        })
    }

    /// Aggregate all recorded metrics of one category.
    pub fn category_score(&self, category_id: &str) -> Result<CategoryScore, ScoreError> {
        Ok(self.category_aggregate(category_id)?.score)
    }

    fn category_aggregate(&self, category_id: &str) -> Result<CategoryAggregate, ScoreError> {
        let category = self.catalog.category_by_id(category_id)?;

        let metrics = self.catalog.metrics_by_category(category_id);
        if metrics.is_empty() {
            return Err(ScoreError::NoMetrics(category_id.to_string()));
        }

        let mut metric_scores = Vec::with_capacity(metrics.len());
        let mut scores = Vec::with_capacity(metrics.len());
        let mut kpi_scores = Vec::new();
        let mut kri_scores = Vec::new();

        for metric in metrics {
            let reference: MetricRef = metric.reference.parse::<MetricRef>()?;
            let metric_score = self.score_reference(&reference, metric.value)?;
            scores.push(metric_score.score);
            match reference.kind {
                MetricKind::Kpi => kpi_scores.push(metric_score.score),
                MetricKind::Kri => kri_scores.push(metric_score.score),
            }
            metric_scores.push(metric_score);
        }

        let weights = &self.levers.weights;
        let global = &self.levers.global;

        let score = self.method.combine(&scores);
        let status = determine_status(
            score,
            weights
                .category_thresholds
                .get(category_id)
                .unwrap_or(&global.thresholds),
        );

        // A missing KPI (or KRI) subset means "unknown", which reports as
        // caution rather than success or failure.
        let kpi_score = self.method.combine(&kpi_scores);
        let kpi_status = if kpi_scores.is_empty() {
            TrafficLightStatus::Yellow
        } else {
            determine_status(
                kpi_score,
                weights
                    .category_kpi_thresholds
                    .get(category_id)
                    .unwrap_or(&global.kpi_thresholds),
            )
        };

        let kri_score = self.method.combine(&kri_scores);
        let kri_status = if kri_scores.is_empty() {
            TrafficLightStatus::Yellow
        } else {
            determine_status(
                kri_score,
                weights
                    .category_kri_thresholds
                    .get(category_id)
                    .unwrap_or(&global.kri_thresholds),
            )
        };

        Ok(CategoryAggregate {
            score: CategoryScore {
                id: category.id.clone(),
                name: category.name.clone(),
                score,
                kpi_score,
                kri_score,
                status,
                kpi_status,
                kri_status,
                metrics: metric_scores,
            },
            has_kpis: !kpi_scores.is_empty(),
            has_kris: !kri_scores.is_empty(),
        })
    }

    /// Aggregate across every category with at least one recorded metric.
    /// Categories without data are skipped; any other failure aborts the
    /// whole computation.
    pub fn overall_score(&self) -> Result<OverallScore, ScoreError> {
        let mut category_scores = Vec::new();
        let mut scores = Vec::new();
        let mut weights = Vec::new();
        let mut kpi_entries: Vec<(i64, f64)> = Vec::new();
        let mut kri_entries: Vec<(i64, f64)> = Vec::new();

        for category in self.catalog.categories() {
            let aggregate = match self.category_aggregate(&category.id) {
                Ok(aggregate) => aggregate,
                Err(ScoreError::NoMetrics(_)) => continue,
                Err(err) => return Err(err),
            };

            let weight = self.category_weight(&category.id);
            scores.push(aggregate.score.score);
            weights.push(weight);
            if aggregate.has_kpis {
                kpi_entries.push((aggregate.score.kpi_score, weight));
            }
            if aggregate.has_kris {
                kri_entries.push((aggregate.score.kri_score, weight));
            }
            category_scores.push(aggregate.score);
        }

        if category_scores.is_empty() {
            return Err(ScoreError::NoCategoriesWithMetrics);
        }

        let global = &self.levers.global;
        let score = self.method.combine_weighted(&scores, &weights);

        let (kpi_score, kpi_status) = sub_aggregate(&kpi_entries, &global.kpi_thresholds);
        let (kri_score, kri_status) = sub_aggregate(&kri_entries, &global.kri_thresholds);

        Ok(OverallScore {
            score,
            kpi_score,
            kri_score,
            status: determine_status(score, &global.thresholds),
            kpi_status,
            kri_status,
            categories: category_scores,
        })
    }
}

struct CategoryAggregate {
    score: CategoryScore,
    has_kpis: bool,
    has_kris: bool,
}

/// KPI-only / KRI-only overall sub-score: weighted average over the
/// categories that contributed the corresponding subset, normalized by their
/// weights. No contributors reports as caution.
fn sub_aggregate(
    entries: &[(i64, f64)],
    thresholds: &Thresholds,
) -> (i64, TrafficLightStatus) {
    if entries.is_empty() {
        return (0, TrafficLightStatus::Yellow);
    }

    let (scores, weights): (Vec<i64>, Vec<f64>) = entries.iter().copied().unzip();
    let score = aggregate::weighted_average(&scores, &weights);
    (score, determine_status(score, thresholds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdRange;

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

    #[test]
    fn first_matching_band_wins_over_later_overlaps() {
        let bands = vec![
            band(None, Some(5.0), 95),
            band(Some(0.0), Some(10.0), 85),
        ];
        assert_eq!(band_score(&bands, 3.0), 95);
    }

    #[test]
    fn unmatched_value_falls_back_to_last_band() {
        let bands = vec![
            band(None, Some(0.0), 95),
            band(Some(0.0), Some(2.0), 85),
            band(Some(2.0), Some(5.0), 75),
            band(Some(5.0), Some(10.0), 65),
            band(Some(10.0), None, 30),
        ];
        assert_eq!(band_score(&bands, 15.0), 30);

        // Fallback also applies when the tail band is bounded and the value
        // escapes every declared range.
        let gapped = vec![band(None, Some(1.0), 90), band(Some(5.0), Some(6.0), 40)];
        assert_eq!(band_score(&gapped, 3.0), 40);
    }

    #[test]
    fn zero_bands_yield_the_neutral_score() {
        assert_eq!(band_score(&[], 42.0), NEUTRAL_SCORE);
    }

    #[test]
    fn status_boundaries_are_inclusive() {
        let t = thresholds((80, 100), (60, 79), (0, 59));
        assert_eq!(determine_status(80, &t), TrafficLightStatus::Green);
        assert_eq!(determine_status(79, &t), TrafficLightStatus::Yellow);
        assert_eq!(determine_status(60, &t), TrafficLightStatus::Yellow);
        assert_eq!(determine_status(59, &t), TrafficLightStatus::Red);
        assert_eq!(determine_status(100, &t), TrafficLightStatus::Green);
        assert_eq!(determine_status(0, &t), TrafficLightStatus::Red);
    }

    #[test]
    fn red_acts_as_fallback_outside_every_range() {
        let t = thresholds((80, 100), (60, 79), (10, 59));
        assert_eq!(determine_status(5, &t), TrafficLightStatus::Red);
    }
}
