use super::{RegressionError, Regressor, check_features, check_fit_input};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    Linear,
    Rbf,
    Polynomial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvrParams {
    pub kernel: Kernel,
    pub c: f64,
    pub epsilon: f64,
    /// `None` selects `1 / (n_features · var(X))`.
    pub gamma: Option<f64>,
    /// Only used by [`Kernel::Polynomial`].
    pub degree: u32,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for SvrParams {
    fn default() -> Self {
        Self {
            kernel: Kernel::Rbf,
            c: 1.0,
            epsilon: 0.1,
            gamma: None,
            degree: 3,
            max_iter: 1000,
            tol: 1e-3,
        }
    }
}

#[derive(Debug, Clone)]
struct FittedSvr {
    support: DMatrix<f64>,
    dual: DVector<f64>,
    gamma: f64,
    offset: f64,
}

/// Epsilon-insensitive support vector regression solved by dual coordinate descent.
///
/// The bias term is absorbed by centering the targets, which removes the equality
/// constraint from the dual and lets every coefficient be updated in closed form.
#[derive(Debug, Clone)]
pub struct Svr {
    params: SvrParams,
    fitted: Option<FittedSvr>,
}

impl Svr {
    pub fn new(params: SvrParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    fn kernel(&self, a: &[f64], b: &[f64], gamma: f64) -> f64 {
        let dot = || a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
        match self.params.kernel {
            Kernel::Linear => dot(),
            Kernel::Polynomial => (gamma * dot()).powi(self.params.degree as i32),
            Kernel::Rbf => {
                let sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
                (-gamma * sq).exp()
            }
        }
    }

    fn rows(x: &DMatrix<f64>) -> Vec<Vec<f64>> {
        x.row_iter().map(|r| r.iter().copied().collect()).collect()
    }
}

fn scale_gamma(x: &DMatrix<f64>) -> f64 {
    let n = x.len() as f64;
    let mean = x.sum() / n;
    let var = x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    if var > f64::EPSILON {
        1.0 / (x.ncols() as f64 * var)
    } else {
        1.0
    }
}

impl Regressor for Svr {
    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(), RegressionError> {
        check_fit_input(x, y)?;
        let gamma = self.params.gamma.unwrap_or_else(|| scale_gamma(x));
        let rows = Self::rows(x);
        let n = rows.len();

        let gram_columns: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|j| (0..n).map(|i| self.kernel(&rows[i], &rows[j], gamma)).collect())
            .collect();
        let gram = DMatrix::from_iterator(n, n, gram_columns.into_iter().flatten());

        let offset = y.mean();
        let target = y.add_scalar(-offset);
        let mut dual = DVector::<f64>::zeros(n);
        let mut fitted_values = DVector::<f64>::zeros(n);
        let c = self.params.c;
        let eps = self.params.epsilon;

        let mut epochs = 0;
        for _ in 0..self.params.max_iter {
            epochs += 1;
            let mut max_delta: f64 = 0.0;
            for i in 0..n {
                let kii = gram[(i, i)];
                if kii <= 0.0 {
                    continue;
                }
                let residual = target[i] - (fitted_values[i] - kii * dual[i]);
                let shrunk = residual.signum() * (residual.abs() - eps).max(0.0);
                let updated = (shrunk / kii).clamp(-c, c);
                let delta = updated - dual[i];
                if delta != 0.0 {
                    fitted_values.axpy(delta, &gram.column(i), 1.0);
                    dual[i] = updated;
                    max_delta = max_delta.max(delta.abs());
                }
            }
            if max_delta < self.params.tol {
                break;
            }
        }
        debug!(epochs, c, gamma, "SVR dual coordinate descent finished.");

        self.fitted = Some(FittedSvr {
            support: x.clone(),
            dual,
            gamma,
            offset,
        });
        Ok(())
    }

    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>, RegressionError> {
        let fitted = self.fitted.as_ref().ok_or(RegressionError::NotFitted)?;
        check_features(fitted.support.ncols(), x)?;
        let support = Self::rows(&fitted.support);
        let queries = Self::rows(x);
        let values: Vec<f64> = queries
            .par_iter()
            .map(|q| {
                support
                    .iter()
                    .zip(fitted.dual.iter())
                    .filter(|(_, beta)| **beta != 0.0)
                    .map(|(s, beta)| beta * self.kernel(q, s, fitted.gamma))
                    .sum::<f64>()
                    + fitted.offset
            })
            .collect();
        Ok(DVector::from_vec(values))
    }
}
