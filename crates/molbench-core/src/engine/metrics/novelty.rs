use super::sampling::{Sampler, sampling_record};
use super::{Metric, MetricInput, int_sweep};
use crate::core::chem::smiles::canonicalize;
use crate::core::models::record::MetricRecord;
use crate::core::regression::registry::RegressorRegistry;
use crate::engine::config::BenchmarkConfig;
use crate::engine::error::EngineError;
use crate::engine::inference::InferenceClient;
use crate::engine::variation::Variation;
use std::collections::HashSet;

const NAME: &str = "novelty";

/// Fraction of valid samples that do not occur in the evaluated dataset.
pub struct Novelty<'c> {
    sampler: Sampler<'c>,
}

impl<'c> Novelty<'c> {
    pub fn new(client: &'c dyn InferenceClient) -> Self {
        Self {
            sampler: Sampler::new(client),
        }
    }
}

impl Metric for Novelty<'_> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn variations(
        &self,
        config: &BenchmarkConfig,
        _registry: &RegressorRegistry,
    ) -> Result<Vec<Variation>, EngineError> {
        Ok(int_sweep(&config.metrics.novelty.values))
    }

    fn calculate(&self, input: &MetricInput<'_>) -> Result<MetricRecord, EngineError> {
        let samples = self.sampler.sample(NAME, input)?;
        let reference: HashSet<String> = input
            .smiles
            .smiles()
            .iter()
            .filter_map(|s| canonicalize(s))
            .collect();

        let valid: Vec<String> = samples.all().filter_map(canonicalize).collect();
        let value = if valid.is_empty() {
            0.0
        } else {
            valid.iter().filter(|s| !reference.contains(*s)).count() as f64 / valid.len() as f64
        };
        Ok(sampling_record(NAME, &samples, input.num_samples, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::record::FieldValue;
    use crate::engine::inference::testing::MockClient;
    use crate::engine::metrics::fixtures;

    #[test]
    fn counts_valid_samples_missing_from_dataset() {
        let client = MockClient::ready(1)
            .with_similars("CCO", &["CCO", "CCN", "C1"])
            .with_similars("CCN", &["CCS", "CCN"]);
        let (smiles, fp) = fixtures::dataset(&["CCO", "CCN"], &[vec![1.0], vec![0.0]]);
        let radius = Variation::Int(5);
        let record = Novelty::new(&client)
            .calculate(&fixtures::input(&smiles, &fp, &radius, 3))
            .unwrap();
        // Valid samples: CCO, CCN, CCS, CCN; only CCS is new.
        assert_eq!(record.get("value"), Some(&FieldValue::Float(0.25)));
    }

    #[test]
    fn echoed_inputs_are_never_novel() {
        let client = MockClient::ready(1);
        let (smiles, fp) = fixtures::dataset(&["CCO"], &[vec![1.0]]);
        let radius = Variation::Int(1);
        let record = Novelty::new(&client)
            .calculate(&fixtures::input(&smiles, &fp, &radius, 2))
            .unwrap();
        assert_eq!(record.get("value"), Some(&FieldValue::Float(0.0)));
    }
}
