//! Metric catalog and observation store.
//!
//! The catalog owns the category/KPI/KRI definitions loaded from
//! configuration together with the recorded metric observations. The scoring
//! engine borrows it read-only; the only mutating operation is
//! [`MetricCatalog::update_metric`], invoked by the CLI layer.

mod reference;

pub use reference::{MetricKind, MetricRef};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recorded values outside this magnitude are treated as data-entry mistakes.
pub const MAX_METRIC_VALUE: f64 = 1_000_000.0;

/// Lookup and update failures raised by the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid metric reference format: {0}")]
    InvalidReference(String),
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    #[error("{kind} {metric} not found in category {category}")]
    DefinitionNotFound {
        category: String,
        kind: MetricKind,
        metric: String,
    },
    #[error("metric not found: {0}")]
    MetricNotFound(String),
    #[error("metric value out of reasonable bounds: {0}")]
    ValueOutOfBounds(f64),
}

/// A numeric range mapped to a fixed score. Bounds are inclusive where
/// declared and unbounded where absent. Band order within a definition is
/// significant: the first matching band wins, even when bands overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub score: i64,
}

impl ScoringBand {
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Key Performance Indicator definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub target: f64,
    #[serde(default)]
    pub scoring_bands: Vec<ScoringBand>,
}

/// Key Risk Indicator definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kri {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub scoring_bands: Vec<ScoringBand>,
}

/// Groups KPI and KRI definitions under one reporting area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kpis: Vec<Kpi>,
    #[serde(default)]
    pub kris: Vec<Kri>,
}

/// Definition lookup result, dispatched once at the reference-decoding
/// boundary so scoring logic never re-inspects the metric type.
#[derive(Debug, Clone, Copy)]
pub enum MetricDefinition<'a> {
    Kpi(&'a Kpi),
    Kri(&'a Kri),
}

impl MetricDefinition<'_> {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricDefinition::Kpi(_) => MetricKind::Kpi,
            MetricDefinition::Kri(_) => MetricKind::Kri,
        }
    }

    pub fn scoring_bands(&self) -> &[ScoringBand] {
        match self {
            MetricDefinition::Kpi(kpi) => &kpi.scoring_bands,
            MetricDefinition::Kri(kri) => &kri.scoring_bands,
        }
    }
}

/// A single recorded observation for a metric reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub reference: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    /// Data file this observation was loaded from; grouping hint for
    /// persistence only, never consulted by scoring.
    #[serde(default, skip_serializing)]
    pub source_file: String,
}

/// Category definitions as loaded from `metrics.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Metric observations as loaded from the data directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsData {
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

/// Combined view over definitions and observations. One catalog instance is
/// an immutable snapshot for the duration of a score computation; multiple
/// independent snapshots can coexist (useful for tests).
#[derive(Debug, Clone, Default)]
pub struct MetricCatalog {
    config: MetricsConfig,
    data: MetricsData,
}

impl MetricCatalog {
    pub fn new(config: MetricsConfig, data: MetricsData) -> Self {
        Self { config, data }
    }

    pub fn categories(&self) -> &[Category] {
        &self.config.categories
    }

    pub fn category_by_id(&self, category_id: &str) -> Result<&Category, CatalogError> {
        self.config
            .categories
            .iter()
            .find(|category| category.id == category_id)
            .ok_or_else(|| CatalogError::CategoryNotFound(category_id.to_string()))
    }

    /// All observations whose reference's category segment matches. An empty
    /// result is valid: the category simply has no recorded data yet.
    pub fn metrics_by_category(&self, category_id: &str) -> Vec<&Metric> {
        self.data
            .metrics
            .iter()
            .filter(|metric| {
                metric
                    .reference
                    .split('.')
                    .next()
                    .is_some_and(|segment| segment == category_id)
            })
            .collect()
    }

    pub fn all_metrics(&self) -> &[Metric] {
        &self.data.metrics
    }

    pub fn metric_by_reference(&self, reference: &str) -> Result<&Metric, CatalogError> {
        self.data
            .metrics
            .iter()
            .find(|metric| metric.reference == reference)
            .ok_or_else(|| CatalogError::MetricNotFound(reference.to_string()))
    }

    /// Resolve a parsed reference to its KPI or KRI definition.
    pub fn metric_definition(
        &self,
        reference: &MetricRef,
    ) -> Result<MetricDefinition<'_>, CatalogError> {
        let category = self.category_by_id(&reference.category)?;

        let not_found = || CatalogError::DefinitionNotFound {
            category: reference.category.clone(),
            kind: reference.kind,
            metric: reference.metric.clone(),
        };

        match reference.kind {
            MetricKind::Kpi => category
                .kpis
                .iter()
                .find(|kpi| kpi.id == reference.metric)
                .map(MetricDefinition::Kpi)
                .ok_or_else(not_found),
            MetricKind::Kri => category
                .kris
                .iter()
                .find(|kri| kri.id == reference.metric)
                .map(MetricDefinition::Kri)
                .ok_or_else(not_found),
        }
    }

    /// Overwrite the value and timestamp of an existing observation, or
    /// append a new one. Rejects malformed references and unreasonable
    /// values (NaN, infinities, magnitudes beyond [`MAX_METRIC_VALUE`]).
    pub fn update_metric(&mut self, reference: &str, value: f64) -> Result<(), CatalogError> {
        let parsed: MetricRef = reference.parse()?;

        if !value.is_finite() || value.abs() > MAX_METRIC_VALUE {
            return Err(CatalogError::ValueOutOfBounds(value));
        }

        let source_file = format!("{}.yaml", parsed.category);
        let now = Utc::now();

        if let Some(existing) = self
            .data
            .metrics
            .iter_mut()
            .find(|metric| metric.reference == reference)
        {
            existing.value = value;
            existing.timestamp = now;
            if existing.source_file.is_empty() {
                existing.source_file = source_file;
            }
            return Ok(());
        }

        self.data.metrics.push(Metric {
            reference: reference.to_string(),
            value,
            timestamp: now,
            source_file,
        });

        Ok(())
    }

    pub fn data(&self) -> &MetricsData {
        &self.data
    }
}
