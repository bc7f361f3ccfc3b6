use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::catalog::{Metric, MetricsConfig, MetricsData};

use super::LeversConfig;

/// Pre-parse guard limit; definition and data files are small by nature.
const MAX_YAML_BYTES: usize = 10 * 1024 * 1024;

/// Observations with no recorded source file are persisted here.
const DEFAULT_DATA_FILE: &str = "default.yaml";

const DEFAULT_METRICS_CONFIG: &str = include_str!("defaults/metrics.yaml");
const DEFAULT_LEVERS_CONFIG: &str = include_str!("defaults/levers.yaml");
const DEFAULT_DATA_FILES: &[(&str, &str)] = &[
    ("app_sec.yaml", include_str!("defaults/data/app_sec.yaml")),
    ("infra_sec.yaml", include_str!("defaults/data/infra_sec.yaml")),
    ("compliance.yaml", include_str!("defaults/data/compliance.yaml")),
];

/// Failures while reading or writing configuration and data files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to encode metrics data: {0}")]
    Encode(#[source] serde_yaml::Error),
    #[error("rejected {}: {reason}", path.display())]
    UnsafeYaml { path: PathBuf, reason: String },
    #[error("invalid metric file name: {0}")]
    InvalidFileName(String),
    #[error("metric file already exists: {0}")]
    FileExists(String),
    #[error("no metric data could be loaded: {0}")]
    NoUsableData(String),
}

/// Loads and persists the YAML configuration and metric data files.
///
/// The loader owns all filesystem access; the catalog and scoring engine
/// only ever see parsed values. Writers are serialized through a per-loader
/// lock since saving rewrites a grouped collection across several files.
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl ConfigLoader {
    pub fn new(config_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load category/KPI/KRI definitions from `metrics.yaml`. A missing file
    /// yields an empty configuration rather than an error.
    pub fn load_metrics_config(&self) -> Result<MetricsConfig, ConfigError> {
        let path = self.config_dir.join("metrics.yaml");
        match self.read_guarded(&path)? {
            Some(data) => parse_yaml(&path, &data),
            None => Ok(MetricsConfig::default()),
        }
    }

    /// Load thresholds and weights from `levers.yaml`. A missing file yields
    /// the default levers.
    pub fn load_levers_config(&self) -> Result<LeversConfig, ConfigError> {
        let path = self.config_dir.join("levers.yaml");
        match self.read_guarded(&path)? {
            Some(data) => parse_yaml(&path, &data),
            None => Ok(LeversConfig::default()),
        }
    }

    /// Load all metric observations from `*.yaml`/`*.yml` files in the data
    /// directory, tagging each with its source file. Individually unreadable
    /// files are skipped; only if nothing loads at all is the first problem
    /// reported.
    pub fn load_metrics_data(&self) -> Result<MetricsData, ConfigError> {
        if !self.data_dir.exists() {
            return Ok(MetricsData::default());
        }

        let entries = fs::read_dir(&self.data_dir).map_err(|source| ConfigError::Read {
            path: self.data_dir.clone(),
            source,
        })?;

        let mut all = MetricsData::default();
        let mut first_problem: Option<String> = None;

        for entry in entries {
            let entry = entry.map_err(|source| ConfigError::Read {
                path: self.data_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !is_yaml_file(&path) {
                continue;
            }

            let loaded: Result<MetricsData, ConfigError> = self
                .read_guarded(&path)
                .and_then(|data| match data {
                    Some(data) => parse_yaml(&path, &data),
                    None => Ok(MetricsData::default()),
                });

            match loaded {
                Ok(mut file_metrics) => {
                    let file_name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());
                    for metric in &mut file_metrics.metrics {
                        metric.source_file = file_name.clone();
                    }
                    all.metrics.append(&mut file_metrics.metrics);
                }
                Err(err) => {
                    first_problem.get_or_insert_with(|| err.to_string());
                }
            }
        }

        if all.metrics.is_empty() {
            if let Some(problem) = first_problem {
                return Err(ConfigError::NoUsableData(problem));
            }
        }

        Ok(all)
    }

    /// Persist observations, grouped by source file, rewriting each file
    /// atomically (temp file + rename).
    pub fn save_metrics_data(&self, data: &MetricsData) -> Result<(), ConfigError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        self.ensure_data_dir()?;

        let mut by_file: Vec<(String, Vec<&Metric>)> = Vec::new();
        for metric in &data.metrics {
            let file_name = if metric.source_file.is_empty() {
                DEFAULT_DATA_FILE.to_string()
            } else {
                metric.source_file.clone()
            };
            match by_file.iter_mut().find(|(name, _)| *name == file_name) {
                Some((_, group)) => group.push(metric),
                None => by_file.push((file_name, vec![metric])),
            }
        }

        for (file_name, group) in by_file {
            let file_data = MetricsData {
                metrics: group.into_iter().cloned().collect(),
            };
            let encoded = serde_yaml::to_string(&file_data).map_err(ConfigError::Encode)?;
            self.write_atomic(&self.data_dir.join(&file_name), encoded.as_bytes())?;
        }

        Ok(())
    }

    /// Create a new, empty metric data file. Returns the final file name
    /// (with a `.yaml` suffix appended if absent).
    pub fn create_metric_file(&self, file_name: &str) -> Result<String, ConfigError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut file_name = file_name.to_string();
        if !file_name.ends_with(".yaml") && !file_name.ends_with(".yml") {
            file_name.push_str(".yaml");
        }

        // Path traversal guard.
        if file_name.contains('/') || file_name.contains('\\') {
            return Err(ConfigError::InvalidFileName(file_name));
        }

        self.ensure_data_dir()?;

        let path = self.data_dir.join(&file_name);
        if path.exists() {
            return Err(ConfigError::FileExists(file_name));
        }

        let encoded =
            serde_yaml::to_string(&MetricsData::default()).map_err(ConfigError::Encode)?;
        self.write_atomic(&path, encoded.as_bytes())?;

        Ok(file_name)
    }

    /// Migrate the legacy data layouts into per-category files: a flat
    /// `metrics.yaml` inside the data directory, and a `metrics/`
    /// subdirectory of per-file YAML. Migrated metrics are regrouped by
    /// their reference's category segment; the legacy file is renamed to
    /// `.bak` and the legacy directory to `metrics.bak`.
    pub fn migrate_metrics_data(&self) -> Result<(), ConfigError> {
        let mut migrated = MetricsData::default();

        let legacy_path = self.data_dir.join("metrics.yaml");
        let had_flat_file = match self.read_guarded(&legacy_path)? {
            Some(data) => {
                let mut legacy: MetricsData = parse_yaml(&legacy_path, &data)?;
                migrated.metrics.append(&mut legacy.metrics);
                true
            }
            None => false,
        };

        let legacy_dir = self.data_dir.join("metrics");
        let had_directory = legacy_dir.is_dir();
        if had_directory {
            let entries = fs::read_dir(&legacy_dir).map_err(|source| ConfigError::Read {
                path: legacy_dir.clone(),
                source,
            })?;
            for entry in entries {
                let entry = entry.map_err(|source| ConfigError::Read {
                    path: legacy_dir.clone(),
                    source,
                })?;
                let path = entry.path();
                if !is_yaml_file(&path) {
                    continue;
                }
                if let Some(data) = self.read_guarded(&path)? {
                    let mut file_metrics: MetricsData = parse_yaml(&path, &data)?;
                    migrated.metrics.append(&mut file_metrics.metrics);
                }
            }
        }

        if !had_flat_file && !had_directory {
            return Ok(());
        }

        for metric in &mut migrated.metrics {
            metric.source_file = metric
                .reference
                .split('.')
                .next()
                .filter(|segment| !segment.is_empty())
                .map(|category| format!("{category}.yaml"))
                .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());
        }

        if !migrated.metrics.is_empty() {
            self.save_metrics_data(&migrated)?;
        }

        if had_flat_file {
            let backup_path = legacy_path.with_extension("yaml.bak");
            fs::rename(&legacy_path, &backup_path).map_err(|source| ConfigError::Write {
                path: backup_path,
                source,
            })?;
        }

        if had_directory {
            let backup_dir = self.data_dir.join("metrics.bak");
            fs::rename(&legacy_dir, &backup_dir).map_err(|source| ConfigError::Write {
                path: backup_dir,
                source,
            })?;
        }

        Ok(())
    }

    /// Create the config and data directories and populate them with the
    /// embedded default files, skipping any file that already exists.
    pub fn create_default_files(&self) -> Result<(), ConfigError> {
        self.ensure_dir(&self.config_dir)?;
        self.ensure_data_dir()?;

        self.write_if_absent(&self.config_dir.join("metrics.yaml"), DEFAULT_METRICS_CONFIG)?;
        self.write_if_absent(&self.config_dir.join("levers.yaml"), DEFAULT_LEVERS_CONFIG)?;

        for (file_name, contents) in DEFAULT_DATA_FILES {
            self.write_if_absent(&self.data_dir.join(file_name), contents)?;
        }

        Ok(())
    }

    fn write_if_absent(&self, path: &Path, contents: &str) -> Result<(), ConfigError> {
        if path.exists() {
            return Ok(());
        }
        fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        self.ensure_dir(&self.data_dir)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
            path: dir.to_path_buf(),
            source,
        })
    }

    /// Read a file and run the pre-parse safety guard. `Ok(None)` means the
    /// file does not exist.
    fn read_guarded(&self, path: &Path) -> Result<Option<Vec<u8>>, ConfigError> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        check_yaml_safety(path, &data)?;
        Ok(Some(data))
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), ConfigError> {
        let tmp_path = path.with_extension("yaml.tmp");
        fs::write(&tmp_path, data).map_err(|source| ConfigError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(ConfigError::Write {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(())
    }
}

fn parse_yaml<T: serde::de::DeserializeOwned>(path: &Path, data: &[u8]) -> Result<T, ConfigError> {
    serde_yaml::from_slice(data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn is_yaml_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

/// Basic safety checks applied before handing bytes to the YAML parser:
/// custom type tags and anchors/aliases are rejected, as are oversized
/// files.
fn check_yaml_safety(path: &Path, data: &[u8]) -> Result<(), ConfigError> {
    let unsafe_yaml = |reason: &str| ConfigError::UnsafeYaml {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if data.len() > MAX_YAML_BYTES {
        return Err(unsafe_yaml("file exceeds 10 MiB limit"));
    }

    if contains(data, b"!!") {
        return Err(unsafe_yaml("custom type tags detected"));
    }

    // Anchors/aliases appear at the start of a line or after a colon; bare
    // `&`/`*` inside text are fine.
    for pattern in [&b"\n&"[..], b"\n*", b": &", b": *"] {
        if contains(data, pattern) {
            return Err(unsafe_yaml("anchors or aliases detected"));
        }
    }

    Ok(())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
