use super::sampling::{Sampler, sampling_record};
use super::{Metric, MetricInput, int_sweep};
use crate::core::chem::smiles;
use crate::core::models::record::MetricRecord;
use crate::core::regression::registry::RegressorRegistry;
use crate::engine::config::BenchmarkConfig;
use crate::engine::error::EngineError;
use crate::engine::inference::InferenceClient;
use crate::engine::variation::Variation;

const NAME: &str = "validity";

/// Fraction of sampled molecules that are syntactically and chemically valid SMILES.
pub struct Validity<'c> {
    sampler: Sampler<'c>,
}

impl<'c> Validity<'c> {
    pub fn new(client: &'c dyn InferenceClient) -> Self {
        Self {
            sampler: Sampler::new(client),
        }
    }
}

impl Metric for Validity<'_> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn variations(
        &self,
        config: &BenchmarkConfig,
        _registry: &RegressorRegistry,
    ) -> Result<Vec<Variation>, EngineError> {
        Ok(int_sweep(&config.metrics.validity.values))
    }

    fn calculate(&self, input: &MetricInput<'_>) -> Result<MetricRecord, EngineError> {
        let samples = self.sampler.sample(NAME, input)?;
        let total = samples.total();
        let value = if total == 0 {
            0.0
        } else {
            samples.all().filter(|s| smiles::is_valid(s)).count() as f64 / total as f64
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
    fn counts_valid_fraction_over_all_samples() {
        let client = MockClient::ready(1)
            .with_similars("CCO", &["CCO", "C1CC", "CCN"])
            .with_similars("c1ccccc1", &["c1ccccc1"]);
        let (smiles, fp) = fixtures::dataset(&["CCO", "c1ccccc1"], &[vec![1.0], vec![0.0]]);
        let radius = Variation::Int(2);
        let record = Validity::new(&client)
            .calculate(&fixtures::input(&smiles, &fp, &radius, 3))
            .unwrap();
        assert_eq!(record.get("value"), Some(&FieldValue::Float(0.75)));
        assert_eq!(record.get("radius"), Some(&FieldValue::Int(2)));
        assert_eq!(record.get("name"), Some(&FieldValue::Text("validity".to_string())));

        let calls = client.similar_calls.lock().unwrap();
        assert_eq!(calls[0], ("CCO".to_string(), 3, 2.0));
    }

    #[test]
    fn no_samples_scores_zero() {
        let client = MockClient::ready(1).with_similars("CC", &[]);
        let (smiles, fp) = fixtures::dataset(&["CC"], &[vec![1.0]]);
        let radius = Variation::Int(1);
        let record = Validity::new(&client)
            .calculate(&fixtures::input(&smiles, &fp, &radius, 5))
            .unwrap();
        assert_eq!(record.get("value"), Some(&FieldValue::Float(0.0)));
    }

    #[test]
    fn named_variation_is_rejected() {
        let client = MockClient::ready(1);
        let (smiles, fp) = fixtures::dataset(&["CC"], &[vec![1.0]]);
        let variation = Variation::from("elastic net");
        let err = Validity::new(&client)
            .calculate(&fixtures::input(&smiles, &fp, &variation, 5))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidVariation { metric: "validity", .. }));
    }
}
