use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CatalogError;

/// Longest accepted reference string, including separators.
const MAX_REFERENCE_LEN: usize = 100;

/// Whether a metric measures performance against a target (KPI) or bounds a
/// risk (KRI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Kpi,
    Kri,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Kpi => "KPI",
            MetricKind::Kri => "KRI",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed composite key `category.TYPE.id` identifying a metric observation
/// and its definition. The TYPE segment is literally `KPI` or `KRI`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricRef {
    pub category: String,
    pub kind: MetricKind,
    pub metric: String,
}

impl MetricRef {
    pub fn new(category: impl Into<String>, kind: MetricKind, metric: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            kind,
            metric: metric.into(),
        }
    }
}

impl FromStr for MetricRef {
    type Err = CatalogError;

    fn from_str(reference: &str) -> Result<Self, Self::Err> {
        if reference.is_empty() || reference.len() > MAX_REFERENCE_LEN {
            return Err(CatalogError::InvalidReference(reference.to_string()));
        }

        if !reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(CatalogError::InvalidReference(reference.to_string()));
        }

        let mut parts = reference.split('.');
        let (category, kind, metric) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(category), Some(kind), Some(metric), None) => (category, kind, metric),
            _ => return Err(CatalogError::InvalidReference(reference.to_string())),
        };

        if category.is_empty() || metric.is_empty() {
            return Err(CatalogError::InvalidReference(reference.to_string()));
        }

        let kind = match kind {
            "KPI" => MetricKind::Kpi,
            "KRI" => MetricKind::Kri,
            _ => return Err(CatalogError::InvalidReference(reference.to_string())),
        };

        Ok(MetricRef::new(category, kind, metric))
    }
}

impl fmt::Display for MetricRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.category, self.kind, self.metric)
    }
}
