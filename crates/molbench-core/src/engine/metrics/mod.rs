//! Chemistry metrics evaluated against the inference service.
//!
//! Every metric declares its own parameter sweep through [`Metric::variations`] and turns one
//! sweep point into one [`MetricRecord`]. The benchmark workflow stamps each record with the
//! checkpoint iteration, timing and data size before persisting it.

mod modelability;
mod nearest_neighbor;
mod novelty;
mod sampling;
mod unique;
mod validity;

pub use modelability::Modelability;
pub use nearest_neighbor::NearestNeighborCorrelation;
pub use novelty::Novelty;
pub use unique::Unique;
pub use validity::Validity;

use super::config::{BenchmarkConfig, MetricSettings};
use super::error::EngineError;
use super::inference::{InferenceClient, InferenceError, Pooling};
use super::variation::Variation;
use crate::core::models::fingerprints::FingerprintDataset;
use crate::core::models::molecules::SmilesDataset;
use crate::core::models::properties::PropertyTable;
use crate::core::models::record::MetricRecord;
use crate::core::regression::estimator::Estimator;
use crate::core::regression::grid::ParamGrid;
use crate::core::regression::registry::RegressorRegistry;

/// Everything a metric may need for one sweep point. The current variation is offered both
/// as `top_k` and as `radius`; each metric reads the one it understands.
#[derive(Debug, Clone, Copy)]
pub struct MetricInput<'a> {
    pub smiles: &'a SmilesDataset,
    pub fingerprints: &'a FingerprintDataset,
    pub top_k: &'a Variation,
    pub radius: &'a Variation,
    pub properties: &'a PropertyTable,
    pub estimator: Option<&'a Estimator>,
    pub param_grid: Option<&'a ParamGrid>,
    pub num_samples: usize,
}

pub trait Metric {
    fn name(&self) -> &'static str;

    /// The ordered sweep this metric runs for the given configuration.
    fn variations(
        &self,
        config: &BenchmarkConfig,
        registry: &RegressorRegistry,
    ) -> Result<Vec<Variation>, EngineError>;

    fn calculate(&self, input: &MetricInput<'_>) -> Result<MetricRecord, EngineError>;
}

/// Builds the enabled metrics in their fixed evaluation order.
pub fn enabled_metrics<'c>(
    settings: &MetricSettings,
    client: &'c dyn InferenceClient,
) -> Vec<Box<dyn Metric + 'c>> {
    let mut metrics: Vec<Box<dyn Metric + 'c>> = Vec::new();
    if settings.validity.enabled {
        metrics.push(Box::new(Validity::new(client)));
    }
    if settings.unique.enabled {
        metrics.push(Box::new(Unique::new(client)));
    }
    if settings.novelty.enabled {
        metrics.push(Box::new(Novelty::new(client)));
    }
    if settings.nearest_neighbor_correlation.enabled {
        metrics.push(Box::new(NearestNeighborCorrelation::new(client)));
    }
    if settings.modelability.enabled {
        metrics.push(Box::new(Modelability::new(client)));
    }
    metrics
}

fn int_sweep(values: &[i64]) -> Vec<Variation> {
    values.iter().copied().map(Variation::Int).collect()
}

/// Embeds every molecule of the dataset. Shorter vectors are zero-padded to the widest one,
/// which only happens with [`Pooling::Flatten`] over molecules of different token lengths.
fn embed_dataset(
    client: &dyn InferenceClient,
    smiles: &SmilesDataset,
    pooling: Pooling,
) -> Result<Vec<Vec<f32>>, EngineError> {
    let mut embeddings = client.embed(smiles.smiles(), pooling)?;
    if embeddings.len() != smiles.len() {
        return Err(InferenceError::CountMismatch {
            expected: smiles.len(),
            found: embeddings.len(),
        }
        .into());
    }
    let width = embeddings.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut embeddings {
        row.resize(width, 0.0);
    }
    Ok(embeddings)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::SweepSettings;
    use crate::engine::inference::testing::MockClient;

    #[test]
    fn enabled_metrics_keep_fixed_order() {
        let client = MockClient::ready(1);
        let settings = MetricSettings {
            novelty: SweepSettings::enabled(vec![1]),
            validity: SweepSettings::enabled(vec![1]),
            nearest_neighbor_correlation: SweepSettings::enabled(vec![5]),
            ..Default::default()
        };
        let names: Vec<_> = enabled_metrics(&settings, &client)
            .iter()
            .map(|m| m.name())
            .collect();
        assert_eq!(names, vec!["validity", "novelty", "nearest neighbor correlation"]);
    }
}
