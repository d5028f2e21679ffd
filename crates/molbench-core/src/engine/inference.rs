use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Checkpoint identifier reported by the inference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iteration(pub u64);

impl fmt::Display for Iteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a single readiness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready(Iteration),
    Unavailable(String),
}

/// How per-token embeddings are reduced to one vector per molecule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    Mean,
    Flatten,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("Request to '{endpoint}' failed: {reason}")]
    Request { endpoint: String, reason: String },
    #[error("Service answered '{endpoint}' with status {status}")]
    Status { endpoint: String, status: u16 },
    #[error("Malformed response from '{endpoint}': {reason}")]
    Malformed { endpoint: String, reason: String },
    #[error("Expected {expected} embeddings, received {found}")]
    CountMismatch { expected: usize, found: usize },
}

/// The generative model service a benchmark run evaluates.
pub trait InferenceClient: Send + Sync {
    /// Asks the service for its current checkpoint. Any failure is reported as
    /// [`Readiness::Unavailable`] so callers can retry.
    fn probe_iteration(&self) -> Readiness;

    /// Samples up to `num_requested` molecules from the latent neighbourhood of `smiles`.
    fn find_similars(
        &self,
        smiles: &str,
        num_requested: usize,
        radius: f64,
    ) -> Result<Vec<String>, InferenceError>;

    /// Embeds every SMILES string, returning one vector per input in input order.
    fn embed(&self, smiles: &[String], pooling: Pooling) -> Result<Vec<Vec<f32>>, InferenceError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_displays_as_number() {
        assert_eq!(Iteration(42).to_string(), "42");
    }
}
