use std::io;
use std::path::PathBuf;

use scorecard::catalog::{CatalogError, MetricCatalog};
use scorecard::config::{ConfigError, ConfigLoader, LeversConfig};
use scorecard::report::ReportError;
use scorecard::scoring::ScoreError;
use tracing::debug;

use crate::telemetry::TelemetryError;

/// Directory under the user's home holding config and data by default.
const APP_DIR_NAME: &str = ".scorecard";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{0}")]
    ValidationFailed(String),
    #[error("could not determine home directory; pass --config-dir and --data-dir explicitly")]
    NoHomeDir,
}

/// Default config and data directories: `$SCORECARD_HOME/{config,data}` when
/// set, otherwise `$HOME/.scorecard/{config,data}`.
pub(crate) fn default_dirs() -> Result<(PathBuf, PathBuf), AppError> {
    let base = match std::env::var_os("SCORECARD_HOME") {
        Some(home) => PathBuf::from(home),
        None => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(APP_DIR_NAME))
            .ok_or(AppError::NoHomeDir)?,
    };
    Ok((base.join("config"), base.join("data")))
}

/// Load everything a scoring command needs: run the legacy data migration,
/// then read definitions, levers, and observations.
pub(crate) fn load_catalog(loader: &ConfigLoader) -> Result<(MetricCatalog, LeversConfig), AppError> {
    loader.migrate_metrics_data()?;

    let config = loader.load_metrics_config()?;
    let levers = loader.load_levers_config()?;
    let data = loader.load_metrics_data()?;

    debug!(
        categories = config.categories.len(),
        observations = data.metrics.len(),
        "catalog loaded"
    );

    Ok((MetricCatalog::new(config, data), levers))
}
