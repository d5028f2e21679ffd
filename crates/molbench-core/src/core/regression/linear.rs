use super::{RegressionError, Regressor, Standardizer, check_features, check_fit_input};
use nalgebra::{DMatrix, DVector};

const SINGULAR_VALUE_EPS: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearParams {
    pub normalize: bool,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self { normalize: true }
    }
}

/// Ordinary least squares with intercept, solved through the SVD pseudo-inverse so that
/// under-determined systems (more features than samples) get the minimum-norm solution.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    params: LinearParams,
    coefficients: Option<DVector<f64>>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new(params: LinearParams) -> Self {
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

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(), RegressionError> {
        check_fit_input(x, y)?;
        let (standardizer, xs) = Standardizer::fit_transform(x, self.params.normalize);
        let y_mean = y.mean();
        let yc = y.add_scalar(-y_mean);

        let weights = xs
            .svd(true, true)
            .solve(&yc, SINGULAR_VALUE_EPS)
            .map_err(|e| RegressionError::Solver(e.to_string()))?;
        let coefficients = weights.component_div(&standardizer.scale);

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

    #[test]
    fn recovers_exact_linear_relation() {
        let x = DMatrix::from_row_slice(5, 2, &[0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 3.0, 5.0, 4.0, 2.0]);
        let y = DVector::from_iterator(5, x.row_iter().map(|r| 2.0 * r[0] - 3.0 * r[1] + 1.5));

        let mut model = LinearRegression::new(LinearParams::default());
        model.fit(&x, &y).unwrap();

        let coef = model.coefficients().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-8);
        assert!((coef[1] + 3.0).abs() < 1e-8);
        assert!((model.intercept() - 1.5).abs() < 1e-8);

        let pred = model.predict(&x).unwrap();
        assert!((pred - y).norm() < 1e-8);
    }

    #[test]
    fn underdetermined_system_interpolates_training_data() {
        let x = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 1.0, 0.0, 1.0, 1.0]);
        let y = DVector::from_vec(vec![1.0, 3.0]);
        let mut model = LinearRegression::new(LinearParams { normalize: false });
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!((pred - y).norm() < 1e-8);
    }

    #[test]
    fn predict_before_fit_fails() {
        let model = LinearRegression::new(LinearParams::default());
        let x = DMatrix::zeros(1, 1);
        assert_eq!(model.predict(&x), Err(RegressionError::NotFitted));
    }

    #[test]
    fn predict_rejects_wrong_feature_count() {
        let x = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let mut model = LinearRegression::new(LinearParams::default());
        model.fit(&x, &y).unwrap();
        let wide = DMatrix::zeros(1, 2);
        assert_eq!(
            model.predict(&wide),
            Err(RegressionError::FeatureMismatch { expected: 1, found: 2 })
        );
    }
}
