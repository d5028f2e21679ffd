use super::{Metric, MetricInput, embed_dataset, int_sweep};
use crate::core::chem::fingerprint::tanimoto_distance_matrix;
use crate::core::models::record::MetricRecord;
use crate::core::regression::registry::RegressorRegistry;
use crate::core::stats::correlation::spearman;
use crate::core::stats::distance::euclidean_distance_matrix;
use crate::core::stats::nan_mean;
use crate::engine::config::BenchmarkConfig;
use crate::engine::error::EngineError;
use crate::engine::inference::{InferenceClient, Pooling};
use crate::engine::variation::Variation;
use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::debug;

const NAME: &str = "nearest neighbor correlation";

/// Spearman correlation between fingerprint (Tanimoto) and embedding (Euclidean) distances
/// over each molecule's `top_k` nearest fingerprint neighbours, averaged over molecules.
pub struct NearestNeighborCorrelation<'c> {
    client: &'c dyn InferenceClient,
}

impl<'c> NearestNeighborCorrelation<'c> {
    pub fn new(client: &'c dyn InferenceClient) -> Self {
        Self { client }
    }
}

/// Per-row correlations. `top_k <= 0` or larger than the number of other rows uses all of them.
pub(crate) fn neighbor_correlations(
    fingerprint_distances: &DMatrix<f64>,
    embedding_distances: &DMatrix<f64>,
    top_k: i64,
) -> Vec<f64> {
    let n = fingerprint_distances.nrows();
    let k = match usize::try_from(top_k) {
        Ok(k) if k > 0 => k.min(n.saturating_sub(1)),
        _ => n.saturating_sub(1),
    };
    (0..n)
        .into_par_iter()
        .map(|i| {
            let mut neighbors: Vec<usize> = (0..n).filter(|&j| j != i).collect();
            neighbors.sort_by(|&a, &b| {
                fingerprint_distances[(i, a)].total_cmp(&fingerprint_distances[(i, b)])
            });
            neighbors.truncate(k);
            let fp: Vec<f64> = neighbors.iter().map(|&j| fingerprint_distances[(i, j)]).collect();
            let emb: Vec<f64> = neighbors.iter().map(|&j| embedding_distances[(i, j)]).collect();
            spearman(&fp, &emb)
        })
        .collect()
}

impl Metric for NearestNeighborCorrelation<'_> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn variations(
        &self,
        config: &BenchmarkConfig,
        _registry: &RegressorRegistry,
    ) -> Result<Vec<Variation>, EngineError> {
        Ok(int_sweep(&config.metrics.nearest_neighbor_correlation.values))
    }

    fn calculate(&self, input: &MetricInput<'_>) -> Result<MetricRecord, EngineError> {
        let Variation::Int(top_k) = *input.top_k else {
            return Err(EngineError::InvalidVariation {
                metric: NAME,
                variation: input.top_k.clone(),
                reason: "expected an integer neighbour count",
            });
        };
        if input.smiles.is_empty() {
            return Err(EngineError::EmptyInput { metric: NAME });
        }

        let embeddings = embed_dataset(self.client, input.smiles, Pooling::Flatten)?;
        let embedding_distances = euclidean_distance_matrix(&embeddings);
        let fingerprint_distances = tanimoto_distance_matrix(input.fingerprints.rows());

        let correlations =
            neighbor_correlations(&fingerprint_distances, &embedding_distances, top_k);
        let defined = correlations.iter().filter(|c| c.is_finite()).count();
        debug!(
            "{}: {} of {} molecules have a defined correlation at top_k {}",
            NAME,
            defined,
            correlations.len(),
            top_k
        );

        Ok(MetricRecord::new()
            .with("name", NAME)
            .with("top_k", top_k)
            .with("value", nan_mean(&correlations)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::record::FieldValue;
    use crate::engine::inference::{InferenceError, Readiness};
    use crate::engine::metrics::fixtures;

    struct FixedEmbeddings(Vec<Vec<f32>>);

    impl InferenceClient for FixedEmbeddings {
        fn probe_iteration(&self) -> Readiness {
            Readiness::Unavailable("not used".to_string())
        }

        fn find_similars(&self, _: &str, _: usize, _: f64) -> Result<Vec<String>, InferenceError> {
            Ok(Vec::new())
        }

        fn embed(&self, _: &[String], pooling: Pooling) -> Result<Vec<Vec<f32>>, InferenceError> {
            assert_eq!(pooling, Pooling::Flatten);
            Ok(self.0.clone())
        }
    }

    fn fingerprints() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 1.0, 1.0, 1.0],
            vec![1.0, 1.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0, 0.0],
        ]
    }

    fn value(client: &FixedEmbeddings, top_k: i64) -> f64 {
        let (smiles, fp) = fixtures::dataset(&["CCCC", "CCC", "C"], &fingerprints());
        let variation = Variation::Int(top_k);
        let record = NearestNeighborCorrelation::new(client)
            .calculate(&fixtures::input(&smiles, &fp, &variation, 1))
            .unwrap();
        assert_eq!(record.get("top_k"), Some(&FieldValue::Int(top_k)));
        match record.get("value") {
            Some(FieldValue::Float(v)) => *v,
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn consistent_neighbourhoods_correlate_perfectly() {
        let client = FixedEmbeddings(vec![vec![0.0], vec![1.0], vec![5.0]]);
        assert!((value(&client, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn one_inverted_neighbourhood_lowers_the_mean() {
        let client = FixedEmbeddings(vec![vec![0.0], vec![5.0], vec![6.0]]);
        assert!((value(&client, 2) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_neighbour_has_no_defined_correlation() {
        let client = FixedEmbeddings(vec![vec![0.0], vec![1.0], vec![5.0]]);
        assert!(value(&client, 1).is_nan());
    }

    #[test]
    fn embedding_count_must_match_dataset() {
        let client = FixedEmbeddings(vec![vec![0.0]]);
        let (smiles, fp) = fixtures::dataset(&["CCCC", "CCC", "C"], &fingerprints());
        let variation = Variation::Int(2);
        let err = NearestNeighborCorrelation::new(&client)
            .calculate(&fixtures::input(&smiles, &fp, &variation, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Inference {
                source: InferenceError::CountMismatch { expected: 3, found: 1 }
            }
        ));
    }
}
