use super::elastic_net::{ElasticNet, ElasticNetParams};
use super::forest::{RandomForest, RandomForestParams};
use super::grid::{ParamSet, ParamValue};
use super::linear::{LinearParams, LinearRegression};
use super::svr::{Kernel, Svr, SvrParams};
use super::{RegressionError, Regressor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstimatorKind {
    RandomForest,
    SupportVectorMachine,
    LinearRegression,
    ElasticNet,
}

impl EstimatorKind {
    pub fn label(&self) -> &'static str {
        match self {
            EstimatorKind::RandomForest => "random forest",
            EstimatorKind::SupportVectorMachine => "support vector machine",
            EstimatorKind::LinearRegression => "linear regression",
            EstimatorKind::ElasticNet => "elastic net",
        }
    }

    /// The base configuration each registry entry starts from before grid values are applied.
    pub fn default_estimator(&self) -> Estimator {
        match self {
            EstimatorKind::RandomForest => Estimator::RandomForest(RandomForestParams::default()),
            EstimatorKind::SupportVectorMachine => Estimator::Svr(SvrParams {
                kernel: Kernel::Rbf,
                ..Default::default()
            }),
            EstimatorKind::LinearRegression => {
                Estimator::LinearRegression(LinearParams::default())
            }
            EstimatorKind::ElasticNet => Estimator::ElasticNet(ElasticNetParams::default()),
        }
    }
}

/// A fully parameterized but unfitted regressor.
#[derive(Debug, Clone, PartialEq)]
pub enum Estimator {
    RandomForest(RandomForestParams),
    Svr(SvrParams),
    LinearRegression(LinearParams),
    ElasticNet(ElasticNetParams),
}

fn invalid(name: &str, value: &ParamValue) -> RegressionError {
    RegressionError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn float(name: &str, value: &ParamValue) -> Result<f64, RegressionError> {
    value.as_f64().ok_or_else(|| invalid(name, value))
}

fn count(name: &str, value: &ParamValue) -> Result<usize, RegressionError> {
    value.as_usize().ok_or_else(|| invalid(name, value))
}

impl Estimator {
    pub fn kind(&self) -> EstimatorKind {
        match self {
            Estimator::RandomForest(_) => EstimatorKind::RandomForest,
            Estimator::Svr(_) => EstimatorKind::SupportVectorMachine,
            Estimator::LinearRegression(_) => EstimatorKind::LinearRegression,
            Estimator::ElasticNet(_) => EstimatorKind::ElasticNet,
        }
    }

    /// Returns a copy with every parameter in `params` applied.
    pub fn with_params(&self, params: &ParamSet) -> Result<Self, RegressionError> {
        let mut estimator = self.clone();
        for (name, value) in params {
            estimator.set_param(name, value)?;
        }
        Ok(estimator)
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), RegressionError> {
        let unknown = |estimator: &Estimator| RegressionError::UnknownParameter {
            estimator: estimator.kind().label(),
            name: name.to_string(),
        };
        match self {
            Estimator::RandomForest(p) => match name {
                "n_estimators" => p.n_estimators = count(name, value)?,
                "max_depth" => p.max_depth = count(name, value)?,
                "min_samples_split" => p.min_samples_split = count(name, value)?,
                "max_features" => p.max_features = float(name, value)?,
                "random_state" => p.random_state = count(name, value)? as u64,
                _ => return Err(unknown(self)),
            },
            Estimator::Svr(p) => match name {
                "C" => p.c = float(name, value)?,
                "epsilon" => p.epsilon = float(name, value)?,
                "gamma" => p.gamma = Some(float(name, value)?),
                "degree" => {
                    p.degree = u32::try_from(count(name, value)?).map_err(|_| invalid(name, value))?
                }
                _ => return Err(unknown(self)),
            },
            Estimator::LinearRegression(p) => match name {
                "normalize" => p.normalize = value.as_bool().ok_or_else(|| invalid(name, value))?,
                _ => return Err(unknown(self)),
            },
            Estimator::ElasticNet(p) => match name {
                "alpha" => p.alpha = float(name, value)?,
                "l1_ratio" => p.l1_ratio = float(name, value)?,
                "normalize" => p.normalize = value.as_bool().ok_or_else(|| invalid(name, value))?,
                "max_iter" => p.max_iter = count(name, value)?,
                _ => return Err(unknown(self)),
            },
        }
        Ok(())
    }

    pub fn build(&self) -> Box<dyn Regressor> {
        match self {
            Estimator::RandomForest(p) => Box::new(RandomForest::new(p.clone())),
            Estimator::Svr(p) => Box::new(Svr::new(p.clone())),
            Estimator::LinearRegression(p) => Box::new(LinearRegression::new(p.clone())),
            Estimator::ElasticNet(p) => Box::new(ElasticNet::new(p.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_values_are_applied_to_a_copy() {
        let base = EstimatorKind::ElasticNet.default_estimator();
        let tuned = base
            .with_params(&vec![
                ("alpha", ParamValue::Float(0.01)),
                ("l1_ratio", ParamValue::Float(0.1)),
            ])
            .unwrap();
        match tuned {
            Estimator::ElasticNet(p) => {
                assert_eq!(p.alpha, 0.01);
                assert_eq!(p.l1_ratio, 0.1);
            }
            other => panic!("unexpected estimator {:?}", other),
        }
        assert_eq!(base, EstimatorKind::ElasticNet.default_estimator());
    }

    #[test]
    fn svr_accepts_integer_c_and_degree() {
        let tuned = EstimatorKind::SupportVectorMachine
            .default_estimator()
            .with_params(&vec![("C", ParamValue::Int(10)), ("degree", ParamValue::Int(5))])
            .unwrap();
        let Estimator::Svr(p) = tuned else {
            panic!("expected svr");
        };
        assert_eq!(p.c, 10.0);
        assert_eq!(p.degree, 5);
        assert_eq!(p.kernel, Kernel::Rbf);
    }

    #[test]
    fn unknown_parameter_names_the_estimator() {
        let err = EstimatorKind::LinearRegression
            .default_estimator()
            .with_params(&vec![("alpha", ParamValue::Float(1.0))])
            .unwrap_err();
        assert_eq!(
            err,
            RegressionError::UnknownParameter {
                estimator: "linear regression",
                name: "alpha".to_string(),
            }
        );
    }

    #[test]
    fn wrongly_typed_values_are_rejected() {
        let err = EstimatorKind::RandomForest
            .default_estimator()
            .with_params(&vec![("n_estimators", ParamValue::Float(2.5))])
            .unwrap_err();
        assert!(matches!(err, RegressionError::InvalidParameter { .. }));
    }

    #[test]
    fn kind_round_trips_through_default_estimator() {
        for kind in [
            EstimatorKind::RandomForest,
            EstimatorKind::SupportVectorMachine,
            EstimatorKind::LinearRegression,
            EstimatorKind::ElasticNet,
        ] {
            assert_eq!(kind.default_estimator().kind(), kind);
        }
    }
}
