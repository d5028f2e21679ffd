use super::estimator::{Estimator, EstimatorKind};
use super::grid::{ParamGrid, ParamValue};
use phf::phf_map;

static KINDS_BY_NAME: phf::Map<&'static str, EstimatorKind> = phf_map! {
    "random forest" => EstimatorKind::RandomForest,
    "support vector machine" => EstimatorKind::SupportVectorMachine,
    "linear regression" => EstimatorKind::LinearRegression,
    "elastic net" => EstimatorKind::ElasticNet,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub name: &'static str,
    pub estimator: Estimator,
    pub param_grid: ParamGrid,
}

/// Named regressors paired with their hyperparameter grids, in a fixed order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressorRegistry {
    entries: Vec<RegistryEntry>,
}

fn floats(values: &[f64]) -> Vec<ParamValue> {
    values.iter().copied().map(ParamValue::Float).collect()
}

fn ints(values: &[i64]) -> Vec<ParamValue> {
    values.iter().copied().map(ParamValue::Int).collect()
}

impl RegressorRegistry {
    pub fn standard() -> Self {
        let grid_for = |kind: EstimatorKind| match kind {
            EstimatorKind::RandomForest => ParamGrid::new().with("n_estimators", ints(&[10, 50])),
            EstimatorKind::SupportVectorMachine => ParamGrid::new()
                .with("C", floats(&[0.01, 0.1, 1.0, 10.0]))
                .with("degree", ints(&[3, 5, 7, 9])),
            EstimatorKind::LinearRegression => {
                ParamGrid::new().with("normalize", vec![ParamValue::Bool(true)])
            }
            EstimatorKind::ElasticNet => ParamGrid::new()
                .with("alpha", floats(&[0.001, 0.01, 0.1, 1.0, 10.0, 100.0]))
                .with("l1_ratio", floats(&[0.1, 0.5, 1.0, 10.0])),
        };

        let entries = [
            EstimatorKind::RandomForest,
            EstimatorKind::SupportVectorMachine,
            EstimatorKind::LinearRegression,
            EstimatorKind::ElasticNet,
        ]
        .into_iter()
        .map(|kind| RegistryEntry {
            name: kind.label(),
            estimator: kind.default_estimator(),
            param_grid: grid_for(kind),
        })
        .collect();
        Self { entries }
    }

    /// Restricts the registry to the given names, preserving registry order.
    /// Unknown names are returned as the error value.
    pub fn only(&self, names: &[String]) -> Result<Self, String> {
        if let Some(unknown) = names.iter().find(|n| !self.contains(n)) {
            return Err(unknown.clone());
        }
        Ok(Self {
            entries: self
                .entries
                .iter()
                .filter(|e| names.iter().any(|n| n == e.name))
                .cloned()
                .collect(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        let kind = KINDS_BY_NAME.get(name)?;
        self.entries.iter().find(|e| e.estimator.kind() == *kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RegressorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_lists_models_in_order() {
        let registry = RegressorRegistry::standard();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "random forest",
                "support vector machine",
                "linear regression",
                "elastic net"
            ]
        );
    }

    #[test]
    fn grids_have_expected_sizes() {
        let registry = RegressorRegistry::standard();
        let sizes: Vec<usize> = registry
            .entries()
            .iter()
            .map(|e| e.param_grid.combinations().len())
            .collect();
        assert_eq!(sizes, vec![2, 16, 1, 24]);
    }

    #[test]
    fn lookup_by_name() {
        let registry = RegressorRegistry::standard();
        let entry = registry.get("elastic net").unwrap();
        assert_eq!(entry.estimator.kind(), EstimatorKind::ElasticNet);
        assert!(registry.get("gradient boosting").is_none());
    }

    #[test]
    fn only_keeps_registry_order_and_rejects_unknown_names() {
        let registry = RegressorRegistry::standard();
        let subset = registry
            .only(&["elastic net".to_string(), "random forest".to_string()])
            .unwrap();
        assert_eq!(
            subset.names().collect::<Vec<_>>(),
            vec!["random forest", "elastic net"]
        );
        assert!(!subset.contains("linear regression"));
        assert_eq!(
            registry.only(&["knn".to_string()]),
            Err("knn".to_string())
        );
    }
}
