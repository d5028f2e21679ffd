use thiserror::Error;

use super::config::ConfigError;
use super::inference::InferenceError;
use super::variation::Variation;
use crate::core::io::dataset::LoadError;
use crate::core::io::results::WriteError;
use crate::core::models::molecules::DatasetError;
use crate::core::regression::RegressionError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Inference service unavailable after {attempts} attempts")]
    ServiceUnavailable { attempts: u32 },

    #[error("Smiles and fingerprint datasets are misaligned: {source}")]
    MisalignedDatasets {
        #[source]
        source: DatasetError,
    },

    #[error("Metric '{metric}' cannot use variation '{variation}': {reason}")]
    InvalidVariation {
        metric: &'static str,
        variation: Variation,
        reason: &'static str,
    },

    #[error("Failed to load dataset: {source}")]
    Load {
        #[from]
        source: LoadError,
    },

    #[error("Failed to persist results: {source}")]
    Write {
        #[from]
        source: WriteError,
    },

    #[error("Inference request failed: {source}")]
    Inference {
        #[from]
        source: InferenceError,
    },

    #[error("Regression failed: {source}")]
    Regression {
        #[from]
        source: RegressionError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Metric '{metric}' received no data")]
    EmptyInput { metric: &'static str },
}
