use super::sampling::{Sampler, sampling_record};
use super::{Metric, MetricInput, int_sweep};
use crate::core::chem::smiles::canonicalize;
use crate::core::models::record::MetricRecord;
use crate::core::regression::registry::RegressorRegistry;
use crate::core::stats;
use crate::engine::config::BenchmarkConfig;
use crate::engine::error::EngineError;
use crate::engine::inference::InferenceClient;
use crate::engine::variation::Variation;
use std::collections::HashSet;

const NAME: &str = "unique";

/// Mean over input molecules of the number of distinct valid samples per requested sample.
pub struct Unique<'c> {
    sampler: Sampler<'c>,
}

impl<'c> Unique<'c> {
    pub fn new(client: &'c dyn InferenceClient) -> Self {
        Self {
            sampler: Sampler::new(client),
        }
    }
}

impl Metric for Unique<'_> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn variations(
        &self,
        config: &BenchmarkConfig,
        _registry: &RegressorRegistry,
    ) -> Result<Vec<Variation>, EngineError> {
        Ok(int_sweep(&config.metrics.unique.values))
    }

    fn calculate(&self, input: &MetricInput<'_>) -> Result<MetricRecord, EngineError> {
        let samples = self.sampler.sample(NAME, input)?;
        let per_input: Vec<f64> = samples
            .per_input
            .iter()
            .map(|generated| {
                let distinct: HashSet<String> =
                    generated.iter().filter_map(|s| canonicalize(s)).collect();
                distinct.len() as f64 / input.num_samples.max(1) as f64
            })
            .collect();
        let value = stats::mean(&per_input);
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
    fn averages_distinct_fraction_per_input() {
        let client = MockClient::ready(1)
            .with_similars("CCO", &["CCN", "CCN", " CCN", "CCC"])
            .with_similars("CC", &["CO", "C(", "CN", "CS"]);
        let (smiles, fp) = fixtures::dataset(&["CCO", "CC"], &[vec![1.0], vec![0.0]]);
        let radius = Variation::Int(1);
        let record = Unique::new(&client)
            .calculate(&fixtures::input(&smiles, &fp, &radius, 4))
            .unwrap();
        // 2/4 for the first input, 3/4 for the second.
        assert_eq!(record.get("value"), Some(&FieldValue::Float(0.625)));
        assert_eq!(record.get("num_samples"), Some(&FieldValue::Int(4)));
    }
}
