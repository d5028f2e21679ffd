use super::estimator::Estimator;
use super::grid::{ParamGrid, ParamSet, format_params};
use super::{RegressionError, mean_squared_error};
use nalgebra::{DMatrix, DVector};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, trace};

pub const DEFAULT_FOLDS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub params: ParamSet,
    pub mean_mse: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridSearchResult {
    pub best_params: ParamSet,
    /// Mean held-out mean squared error of the best candidate.
    pub best_mse: f64,
    pub scores: Vec<CandidateScore>,
}

/// Shuffled k-fold split of `0..n`. The first `n % k` folds receive one extra sample.
pub fn kfold_indices(n: usize, folds: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let base = n / folds;
    let extra = n % folds;
    let mut start = 0;
    (0..folds)
        .map(|f| {
            let size = base + usize::from(f < extra);
            let fold = order[start..start + size].to_vec();
            start += size;
            fold
        })
        .collect()
}

fn select_rows(x: &DMatrix<f64>, rows: &[usize]) -> DMatrix<f64> {
    x.select_rows(rows.iter())
}

fn select_targets(y: &DVector<f64>, rows: &[usize]) -> DVector<f64> {
    DVector::from_iterator(rows.len(), rows.iter().map(|&r| y[r]))
}

fn cross_validate(
    estimator: &Estimator,
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    folds: &[Vec<usize>],
) -> Result<f64, RegressionError> {
    let n = x.nrows();
    let mut total = 0.0;
    for held_out in folds {
        let mut is_test = vec![false; n];
        for &i in held_out {
            is_test[i] = true;
        }
        let train: Vec<usize> = (0..n).filter(|&i| !is_test[i]).collect();

        let mut model = estimator.build();
        model.fit(&select_rows(x, &train), &select_targets(y, &train))?;
        let predicted = model.predict(&select_rows(x, held_out))?;
        total += mean_squared_error(&select_targets(y, held_out), &predicted);
    }
    Ok(total / folds.len() as f64)
}

/// Exhaustive hyperparameter search. Every candidate is scored by its mean held-out
/// mean squared error across the same shuffled folds; ties keep the earlier candidate.
pub fn grid_search_cv(
    estimator: &Estimator,
    grid: &ParamGrid,
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    folds: usize,
    seed: u64,
) -> Result<GridSearchResult, RegressionError> {
    if x.nrows() != y.len() {
        return Err(RegressionError::ShapeMismatch {
            rows: x.nrows(),
            targets: y.len(),
        });
    }
    if folds < 2 || x.nrows() < folds {
        return Err(RegressionError::TooFewSamples {
            folds,
            samples: x.nrows(),
        });
    }

    let splits = kfold_indices(x.nrows(), folds, seed);
    let mut scores = Vec::new();
    for params in grid.combinations() {
        let candidate = estimator.with_params(&params)?;
        let mean_mse = cross_validate(&candidate, x, y, &splits)?;
        trace!("{} -> mse {:.6}", format_params(&params), mean_mse);
        scores.push(CandidateScore { params, mean_mse });
    }

    let best = scores
        .iter()
        .fold(None::<&CandidateScore>, |best, s| match best {
            Some(b) if !(s.mean_mse < b.mean_mse) => Some(b),
            _ => Some(s),
        })
        .ok_or(RegressionError::EmptyData)?;
    debug!(
        "Best {} candidate: {} (mse {:.6})",
        estimator.kind().label(),
        format_params(&best.params),
        best.mean_mse
    );

    Ok(GridSearchResult {
        best_params: best.params.clone(),
        best_mse: best.mean_mse,
        scores,
    })
}
