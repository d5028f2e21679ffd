use super::{RegressionError, Regressor, Standardizer, check_features, check_fit_input};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ElasticNetParams {
    pub alpha: f64,
    /// Mix between L1 (1.0) and L2 (0.0) penalties; clamped to `[0, 1]` when fitting.
    pub l1_ratio: f64,
    pub normalize: bool,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for ElasticNetParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            l1_ratio: 0.5,
            normalize: true,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

/// Elastic net fitted by cyclic coordinate descent on
/// `1/(2n)·‖y − Xw‖² + α·ρ·‖w‖₁ + α·(1 − ρ)/2·‖w‖²`.
#[derive(Debug, Clone)]
pub struct ElasticNet {
    params: ElasticNetParams,
    coefficients: Option<DVector<f64>>,
    intercept: f64,
}

impl ElasticNet {
    pub fn new(params: ElasticNetParams) -> Self {
        Self {
            params,
            coefficients: None,
            intercept: 0.0,
        }
    }

    pub fn coefficients(&self) -> Option<&DVector<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    value.signum() * (value.abs() - threshold).max(0.0)
}

impl Regressor for ElasticNet {
    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(), RegressionError> {
        check_fit_input(x, y)?;
        let (standardizer, xs) = Standardizer::fit_transform(x, self.params.normalize);
        let y_mean = y.mean();
        let mut residual = y.add_scalar(-y_mean);

        let n = xs.nrows() as f64;
        let p = xs.ncols();
        let l1_ratio = self.params.l1_ratio.clamp(0.0, 1.0);
        let l1 = self.params.alpha * l1_ratio * n;
        let l2 = self.params.alpha * (1.0 - l1_ratio) * n;
        let column_norms: Vec<f64> = xs.column_iter().map(|c| c.norm_squared()).collect();

        let mut w = DVector::<f64>::zeros(p);
        let mut iterations = 0;
        for _ in 0..self.params.max_iter {
            iterations += 1;
            let mut max_delta: f64 = 0.0;
            let mut max_weight: f64 = 0.0;
            for j in 0..p {
                if column_norms[j] == 0.0 {
                    continue;
                }
                let old = w[j];
                let rho = xs.column(j).dot(&residual) + column_norms[j] * old;
                let new = soft_threshold(rho, l1) / (column_norms[j] + l2);
                let delta = new - old;
                if delta != 0.0 {
                    residual.axpy(-delta, &xs.column(j), 1.0);
                    w[j] = new;
                }
                max_delta = max_delta.max(delta.abs());
                max_weight = max_weight.max(new.abs());
            }
            if max_weight == 0.0 || max_delta / max_weight < self.params.tol {
                break;
            }
        }
        debug!(iterations, alpha = self.params.alpha, l1_ratio, "Elastic net converged.");

        let coefficients = w.component_div(&standardizer.scale);
        self.intercept = y_mean - standardizer.mean.dot(&coefficients);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>, RegressionError> {
        let coefficients = self.coefficients.as_ref().ok_or(RegressionError::NotFitted)?;
        check_features(coefficients.len(), x)?;
        Ok((x * coefficients).add_scalar(self.intercept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_data() -> (DMatrix<f64>, DVector<f64>) {
        let x = DMatrix::from_row_slice(
            6,
            2,
            &[0.0, 1.0, 1.0, 3.0, 2.0, 0.0, 3.0, 2.0, 4.0, 5.0, 5.0, 1.0],
        );
        let y = DVector::from_iterator(6, x.row_iter().map(|r| 3.0 * r[0] + 0.5 * r[1] + 2.0));
        (x, y)
    }

    #[test]
    fn soft_threshold_shrinks_towards_zero() {
        assert_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_eq!(soft_threshold(0.5, 1.0), 0.0);
    }

    #[test]
    fn tiny_penalty_approaches_least_squares() {
        let (x, y) = toy_data();
        let mut model = ElasticNet::new(ElasticNetParams {
            alpha: 1e-8,
            max_iter: 10_000,
            tol: 1e-10,
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();
        let coef = model.coefficients().unwrap();
        assert!((coef[0] - 3.0).abs() < 1e-3);
        assert!((coef[1] - 0.5).abs() < 1e-3);
        assert!((model.intercept() - 2.0).abs() < 1e-2);
    }

    #[test]
    fn huge_l1_penalty_predicts_the_mean() {
        let (x, y) = toy_data();
        let mut model = ElasticNet::new(ElasticNetParams {
            alpha: 1e6,
            l1_ratio: 1.0,
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();
        assert!(model.coefficients().unwrap().iter().all(|&c| c == 0.0));
        let pred = model.predict(&x).unwrap();
        assert!(pred.iter().all(|&p| (p - y.mean()).abs() < 1e-12));
    }

    #[test]
    fn out_of_range_l1_ratio_is_clamped() {
        let (x, y) = toy_data();
        let mut model = ElasticNet::new(ElasticNetParams {
            alpha: 0.01,
            l1_ratio: 10.0,
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();
        assert!(model.predict(&x).unwrap().iter().all(|p| p.is_finite()));
    }
}
