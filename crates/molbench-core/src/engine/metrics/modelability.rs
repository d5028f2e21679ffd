use super::{Metric, MetricInput, embed_dataset};
use crate::core::models::record::{FieldValue, MetricRecord};
use crate::core::regression::estimator::Estimator;
use crate::core::regression::grid::ParamGrid;
use crate::core::regression::registry::RegressorRegistry;
use crate::core::regression::search::{DEFAULT_FOLDS, grid_search_cv};
use crate::core::stats::nan_mean;
use crate::engine::config::{BenchmarkConfig, ConfigError};
use crate::engine::error::EngineError;
use crate::engine::inference::{InferenceClient, Pooling};
use crate::engine::variation::Variation;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

const NAME: &str = "modelability";
const SEARCH_SEED: u64 = 0;

/// How much better properties are predicted from embeddings than from fingerprints.
///
/// For every property the best cross-validated mean squared error is found for both
/// representations; the per-property ratio is `fingerprint MSE / embedding MSE`, so values
/// above one favour the embeddings. The recorded `value` is the mean ratio.
pub struct Modelability<'c> {
    client: &'c dyn InferenceClient,
}

impl<'c> Modelability<'c> {
    pub fn new(client: &'c dyn InferenceClient) -> Self {
        Self { client }
    }
}

fn to_matrix(rows: &[Vec<f32>]) -> DMatrix<f64> {
    let width = rows.first().map_or(0, Vec::len);
    DMatrix::from_fn(rows.len(), width, |i, j| rows[i][j] as f64)
}

fn property_ratio(
    estimator: &Estimator,
    grid: &ParamGrid,
    embeddings: &DMatrix<f64>,
    fingerprints: &DMatrix<f64>,
    rows: &[usize],
    values: &[f64],
) -> Result<f64, EngineError> {
    let y = DVector::from_iterator(rows.len(), rows.iter().map(|&r| values[r]));
    let embedding_fit = grid_search_cv(
        estimator,
        grid,
        &embeddings.select_rows(rows.iter()),
        &y,
        DEFAULT_FOLDS,
        SEARCH_SEED,
    )?;
    let fingerprint_fit = grid_search_cv(
        estimator,
        grid,
        &fingerprints.select_rows(rows.iter()),
        &y,
        DEFAULT_FOLDS,
        SEARCH_SEED,
    )?;
    Ok(fingerprint_fit.best_mse / embedding_fit.best_mse)
}

impl Metric for Modelability<'_> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn variations(
        &self,
        config: &BenchmarkConfig,
        registry: &RegressorRegistry,
    ) -> Result<Vec<Variation>, EngineError> {
        let selected = match &config.metrics.modelability.models {
            Some(models) => registry.only(models).map_err(|unknown| ConfigError::InvalidParameter {
                name: "metric.modelability.models",
                reason: format!("unknown model '{}'", unknown),
            })?,
            None => registry.clone(),
        };
        Ok(selected.names().map(Variation::from).collect())
    }

    fn calculate(&self, input: &MetricInput<'_>) -> Result<MetricRecord, EngineError> {
        let invalid = |reason| EngineError::InvalidVariation {
            metric: NAME,
            variation: input.radius.clone(),
            reason,
        };
        let model = input.radius.as_name().ok_or_else(|| invalid("expected a model name"))?;
        let (Some(estimator), Some(grid)) = (input.estimator, input.param_grid) else {
            return Err(invalid("no regressor registered under this name"));
        };
        if input.smiles.is_empty() {
            return Err(EngineError::EmptyInput { metric: NAME });
        }

        let embeddings = to_matrix(&embed_dataset(self.client, input.smiles, Pooling::Mean)?);
        let fingerprints = to_matrix(input.fingerprints.rows());

        let mut record = MetricRecord::new()
            .with("name", NAME)
            .with("model", model)
            .with("value", FieldValue::Missing);
        let mut ratios = Vec::new();
        for (property, values) in input.properties.iter() {
            let rows: Vec<usize> = (0..values.len()).filter(|&r| !values[r].is_nan()).collect();
            let field = format!("{}_ratio", property);
            if rows.len() < DEFAULT_FOLDS {
                warn!(
                    "{}: skipping '{}', only {} measured values",
                    NAME,
                    property,
                    rows.len()
                );
                record.set(field, FieldValue::Missing);
                continue;
            }
            let ratio = property_ratio(estimator, grid, &embeddings, &fingerprints, &rows, values)?;
            debug!("{} [{}]: {} ratio {:.4}", NAME, model, property, ratio);
            ratios.push(ratio);
            record.set(field, ratio);
        }

        record.set("value", nan_mean(&ratios));
        Ok(record)
    }
}
