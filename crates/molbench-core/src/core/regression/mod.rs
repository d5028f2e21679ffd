//! # Regression Module
//!
//! Classical regressors used by the modelability metric to judge how well a molecular
//! representation predicts measured properties.
//!
//! - [`estimator`] - Estimator configurations and hyperparameter application
//! - [`grid`] - Hyperparameter grids
//! - [`search`] - Shuffled k-fold grid search scored by mean squared error
//! - [`registry`] - The fixed set of named models with their search grids
//! - [`linear`], [`elastic_net`], [`svr`], [`forest`] - The regressors themselves

pub mod elastic_net;
pub mod estimator;
pub mod forest;
pub mod grid;
pub mod linear;
pub mod registry;
pub mod search;
pub mod svr;

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RegressionError {
    #[error("Cannot fit on an empty dataset")]
    EmptyData,

    #[error("Feature matrix has {rows} rows but {targets} targets were given")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("Model was fitted on {expected} features, got {found}")]
    FeatureMismatch { expected: usize, found: usize },

    #[error("Model must be fitted before predicting")]
    NotFitted,

    #[error("Unknown hyperparameter '{name}' for {estimator}")]
    UnknownParameter {
        estimator: &'static str,
        name: String,
    },

    #[error("Invalid value '{value}' for hyperparameter '{name}'")]
    InvalidParameter { name: String, value: String },

    #[error("{folds}-fold cross-validation needs at least {folds} samples, found {samples}")]
    TooFewSamples { folds: usize, samples: usize },

    #[error("Linear solver failed: {0}")]
    Solver(String),
}

pub trait Regressor: Send + Sync {
    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(), RegressionError>;

    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>, RegressionError>;
}

pub fn mean_squared_error(truth: &DVector<f64>, predicted: &DVector<f64>) -> f64 {
    if truth.is_empty() {
        return f64::NAN;
    }
    (truth - predicted).norm_squared() / truth.len() as f64
}

pub(crate) fn check_fit_input(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(), RegressionError> {
    if x.nrows() == 0 {
        return Err(RegressionError::EmptyData);
    }
    if x.nrows() != y.len() {
        return Err(RegressionError::ShapeMismatch {
            rows: x.nrows(),
            targets: y.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_features(expected: usize, x: &DMatrix<f64>) -> Result<(), RegressionError> {
    if x.ncols() != expected {
        return Err(RegressionError::FeatureMismatch {
            expected,
            found: x.ncols(),
        });
    }
    Ok(())
}

/// Column centering and optional unit-L2-norm scaling applied before fitting linear models.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Standardizer {
    pub mean: DVector<f64>,
    pub scale: DVector<f64>,
}

impl Standardizer {
    pub fn fit_transform(x: &DMatrix<f64>, normalize: bool) -> (Self, DMatrix<f64>) {
        let mean = x.row_mean().transpose();
        let mut centered = x.clone();
        for (j, mut column) in centered.column_iter_mut().enumerate() {
            column.add_scalar_mut(-mean[j]);
        }
        let scale = DVector::from_iterator(
            x.ncols(),
            centered.column_iter().map(|c| {
                let norm = c.norm();
                if normalize && norm > f64::EPSILON { norm } else { 1.0 }
            }),
        );
        for (j, mut column) in centered.column_iter_mut().enumerate() {
            column /= scale[j];
        }
        (Self { mean, scale }, centered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse_of_perfect_prediction_is_zero() {
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(mean_squared_error(&y, &y), 0.0);
        let p = DVector::from_vec(vec![2.0, 2.0, 2.0]);
        assert!((mean_squared_error(&y, &p) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn standardizer_centers_and_scales_columns() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 5.0, 3.0, 5.0]);
        let (s, t) = Standardizer::fit_transform(&x, true);
        assert_eq!(s.mean[0], 2.0);
        assert_eq!(s.mean[1], 5.0);
        assert!((t.column(0).norm() - 1.0).abs() < 1e-12);
        assert_eq!(s.scale[1], 1.0);
        assert_eq!(t[(0, 1)], 0.0);
    }

    #[test]
    fn fit_input_validation() {
        let x = DMatrix::<f64>::zeros(0, 2);
        let y = DVector::<f64>::zeros(0);
        assert_eq!(check_fit_input(&x, &y), Err(RegressionError::EmptyData));
        let x = DMatrix::<f64>::zeros(3, 2);
        let y = DVector::<f64>::zeros(2);
        assert_eq!(
            check_fit_input(&x, &y),
            Err(RegressionError::ShapeMismatch { rows: 3, targets: 2 })
        );
    }
}
