use super::MetricInput;
use crate::core::models::record::MetricRecord;
use crate::engine::error::EngineError;
use crate::engine::inference::InferenceClient;
use crate::engine::variation::Variation;
use tracing::debug;

/// Molecules generated around each input molecule at one radius.
pub(crate) struct Samples {
    pub radius: i64,
    pub per_input: Vec<Vec<String>>,
}

impl Samples {
    pub fn total(&self) -> usize {
        self.per_input.iter().map(Vec::len).sum()
    }

    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.per_input.iter().flatten().map(String::as_str)
    }
}

/// Shared driver for the metrics that sample from the latent space around each input.
pub(crate) struct Sampler<'c> {
    client: &'c dyn InferenceClient,
}

impl<'c> Sampler<'c> {
    pub fn new(client: &'c dyn InferenceClient) -> Self {
        Self { client }
    }

    pub fn sample(&self, metric: &'static str, input: &MetricInput<'_>) -> Result<Samples, EngineError> {
        let Variation::Int(radius) = *input.radius else {
            return Err(EngineError::InvalidVariation {
                metric,
                variation: input.radius.clone(),
                reason: "expected an integer radius",
            });
        };
        if input.smiles.is_empty() {
            return Err(EngineError::EmptyInput { metric });
        }

        let per_input = input
            .smiles
            .smiles()
            .iter()
            .map(|s| self.client.find_similars(s, input.num_samples, radius as f64))
            .collect::<Result<Vec<_>, _>>()?;
        let samples = Samples { radius, per_input };
        debug!(
            "{}: sampled {} molecules around {} inputs at radius {}",
            metric,
            samples.total(),
            input.smiles.len(),
            radius
        );
        Ok(samples)
    }
}

pub(crate) fn sampling_record(
    metric: &'static str,
    samples: &Samples,
    num_samples: usize,
    value: f64,
) -> MetricRecord {
    MetricRecord::new()
        .with("name", metric)
        .with("radius", samples.radius)
        .with("num_samples", num_samples)
        .with("value", value)
}
