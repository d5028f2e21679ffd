use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileOutputConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileSamplingSpec {
    pub seq_len: Option<usize>,
    pub sample_size: Option<usize>,
    pub input_size: Option<i64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileDatasetConfig {
    pub smiles: Option<PathBuf>,
    pub fingerprints: Option<PathBuf>,
    pub smiles_column: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileInferenceConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_interval_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileRadiusMetric {
    pub enabled: Option<bool>,
    pub radius: Option<Vec<i64>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileTopKMetric {
    pub enabled: Option<bool>,
    pub top_k: Option<Vec<i64>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileModelabilityMetric {
    pub enabled: Option<bool>,
    pub models: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileMetricsConfig {
    pub validity: Option<FileRadiusMetric>,
    pub unique: Option<FileRadiusMetric>,
    pub novelty: Option<FileRadiusMetric>,
    #[serde(rename = "nearestNeighborCorrelation")]
    pub nearest_neighbor_correlation: Option<FileTopKMetric>,
    pub modelability: Option<FileModelabilityMetric>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub output: Option<FileOutputConfig>,
    #[serde(rename = "samplingSpec")]
    pub sampling_spec: Option<FileSamplingSpec>,
    pub dataset: Option<FileDatasetConfig>,
    pub inference: Option<FileInferenceConfig>,
    pub metric: Option<FileMetricsConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
