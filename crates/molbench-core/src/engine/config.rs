use super::readiness::RetryPolicy;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingSpec {
    /// Molecules with longer SMILES strings are dropped at load time.
    pub seq_len: usize,
    /// Number of molecules requested from the service per input molecule.
    pub sample_size: usize,
    /// Number of leading rows to evaluate; `<= 0` evaluates the whole dataset.
    pub input_size: i64,
}

impl SamplingSpec {
    pub fn effective_size(&self, loaded: usize) -> usize {
        match usize::try_from(self.input_size) {
            Ok(n) if n > 0 => n.min(loaded),
            _ => loaded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub smiles: PathBuf,
    pub fingerprints: PathBuf,
    pub smiles_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceSettings {
    pub url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

/// An integer-valued sweep (`radius` or `top_k`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSettings {
    pub enabled: bool,
    pub values: Vec<i64>,
}

impl SweepSettings {
    pub fn enabled(values: Vec<i64>) -> Self {
        Self {
            enabled: true,
            values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelabilitySettings {
    pub enabled: bool,
    /// Restricts the swept regressors; `None` sweeps the whole registry.
    pub models: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricSettings {
    pub validity: SweepSettings,
    pub unique: SweepSettings,
    pub novelty: SweepSettings,
    pub nearest_neighbor_correlation: SweepSettings,
    pub modelability: ModelabilitySettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkConfig {
    pub output_dir: PathBuf,
    pub sampling: SamplingSpec,
    pub dataset: DatasetPaths,
    pub inference: InferenceSettings,
    pub metrics: MetricSettings,
}

#[derive(Default)]
pub struct BenchmarkConfigBuilder {
    output_dir: Option<PathBuf>,
    seq_len: Option<usize>,
    sample_size: Option<usize>,
    input_size: Option<i64>,
    smiles_path: Option<PathBuf>,
    fingerprints_path: Option<PathBuf>,
    smiles_column: Option<String>,
    url: Option<String>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    metrics: Option<MetricSettings>,
}

impl BenchmarkConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn seq_len(mut self, len: usize) -> Self {
        self.seq_len = Some(len);
        self
    }
    pub fn sample_size(mut self, n: usize) -> Self {
        self.sample_size = Some(n);
        self
    }
    pub fn input_size(mut self, n: i64) -> Self {
        self.input_size = Some(n);
        self
    }
    pub fn smiles_path(mut self, path: PathBuf) -> Self {
        self.smiles_path = Some(path);
        self
    }
    pub fn fingerprints_path(mut self, path: PathBuf) -> Self {
        self.fingerprints_path = Some(path);
        self
    }
    pub fn smiles_column(mut self, column: impl Into<String>) -> Self {
        self.smiles_column = Some(column.into());
        self
    }
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }
    pub fn metrics(mut self, metrics: MetricSettings) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<BenchmarkConfig, ConfigError> {
        let sampling = SamplingSpec {
            seq_len: self
                .seq_len
                .ok_or(ConfigError::MissingParameter("seq_len"))?,
            sample_size: self
                .sample_size
                .ok_or(ConfigError::MissingParameter("sample_size"))?,
            input_size: self
                .input_size
                .ok_or(ConfigError::MissingParameter("input_size"))?,
        };
        if sampling.seq_len == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "seq_len",
                reason: "must be positive".to_string(),
            });
        }
        if sampling.sample_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "sample_size",
                reason: "must be positive".to_string(),
            });
        }

        let dataset = DatasetPaths {
            smiles: self
                .smiles_path
                .ok_or(ConfigError::MissingParameter("dataset.smiles"))?,
            fingerprints: self
                .fingerprints_path
                .ok_or(ConfigError::MissingParameter("dataset.fingerprints"))?,
            smiles_column: self
                .smiles_column
                .unwrap_or_else(|| crate::core::io::dataset::DEFAULT_SMILES_COLUMN.to_string()),
        };

        let url = self.url.ok_or(ConfigError::MissingParameter("inference.url"))?;
        if url.trim().is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "inference.url",
                reason: "must not be empty".to_string(),
            });
        }
        let retry = self.retry.unwrap_or_default();
        if retry.max_attempts == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "inference.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }

        let metrics = self.metrics.unwrap_or_default();
        for (name, sweep) in [
            ("metric.validity.radius", &metrics.validity),
            ("metric.unique.radius", &metrics.unique),
            ("metric.novelty.radius", &metrics.novelty),
            (
                "metric.nearestNeighborCorrelation.top_k",
                &metrics.nearest_neighbor_correlation,
            ),
        ] {
            if sweep.enabled && sweep.values.is_empty() {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: "an enabled metric needs at least one value".to_string(),
                });
            }
        }

        Ok(BenchmarkConfig {
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            sampling,
            dataset,
            inference: InferenceSettings {
                url,
                timeout: self.timeout.unwrap_or(Duration::from_secs(300)),
                retry,
            },
            metrics,
        })
    }
}
