use super::{RegressionError, Regressor, check_features, check_fit_input};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Fraction of features considered at each split.
    pub max_features: f64,
    pub bootstrap: bool,
    pub random_state: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 16,
            min_samples_split: 2,
            max_features: 1.0,
            bootstrap: true,
            random_state: 0,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    score: f64,
}

struct TreeBuilder<'a> {
    rows: &'a [Vec<f64>],
    targets: &'a [f64],
    params: &'a RandomForestParams,
    features_per_split: usize,
}

impl TreeBuilder<'_> {
    fn build(&self, samples: &[usize], depth: usize, rng: &mut StdRng) -> Node {
        let n = samples.len() as f64;
        let sum: f64 = samples.iter().map(|&s| self.targets[s]).sum();
        let mean = sum / n;

        let homogeneous = samples
            .iter()
            .all(|&s| (self.targets[s] - mean).abs() <= f64::EPSILON);
        if depth >= self.params.max_depth
            || samples.len() < self.params.min_samples_split
            || homogeneous
        {
            return Node::Leaf(mean);
        }

        let Some(best) = self.best_split(samples, sum * sum / n, rng) else {
            return Node::Leaf(mean);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&s| self.rows[s][best.feature] <= best.threshold);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(&left, depth + 1, rng)),
            right: Box::new(self.build(&right, depth + 1, rng)),
        }
    }

    /// Maximizes `sum_l²/n_l + sum_r²/n_r`, which is equivalent to minimizing the
    /// children's summed squared error.
    fn best_split(&self, samples: &[usize], parent_score: f64, rng: &mut StdRng) -> Option<BestSplit> {
        let num_features = self.rows[0].len();
        let mut features: Vec<usize> = (0..num_features).collect();
        if self.features_per_split < num_features {
            features.shuffle(rng);
            features.truncate(self.features_per_split);
        }

        let total: f64 = samples.iter().map(|&s| self.targets[s]).sum();
        let mut best: Option<BestSplit> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(samples.len());

        for feature in features {
            pairs.clear();
            pairs.extend(samples.iter().map(|&s| (self.rows[s][feature], self.targets[s])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
            if pairs[0].0 == pairs[pairs.len() - 1].0 {
                continue;
            }

            let mut left_sum = 0.0;
            for k in 0..pairs.len() - 1 {
                left_sum += pairs[k].1;
                if pairs[k].0 == pairs[k + 1].0 {
                    continue;
                }
                let n_left = (k + 1) as f64;
                let n_right = (pairs.len() - k - 1) as f64;
                let right_sum = total - left_sum;
                let score = left_sum * left_sum / n_left + right_sum * right_sum / n_right;
                if score > parent_score + 1e-12 && best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(BestSplit {
                        feature,
                        threshold: 0.5 * (pairs[k].0 + pairs[k + 1].0),
                        score,
                    });
                }
            }
        }
        best
    }
}

/// Bagged regression trees with variance-reduction splits. Tree `t` is seeded with
/// `random_state + t`, so fits are reproducible regardless of thread scheduling.
#[derive(Debug, Clone)]
pub struct RandomForest {
    params: RandomForestParams,
    trees: Vec<Node>,
    num_features: usize,
}

impl RandomForest {
    pub fn new(params: RandomForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            num_features: 0,
        }
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(), RegressionError> {
        check_fit_input(x, y)?;
        if self.params.n_estimators == 0 {
            return Err(RegressionError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
            });
        }
        let rows: Vec<Vec<f64>> = x.row_iter().map(|r| r.iter().copied().collect()).collect();
        let targets: Vec<f64> = y.iter().copied().collect();
        let features_per_split = ((self.params.max_features.clamp(0.0, 1.0)
            * x.ncols() as f64)
            .ceil() as usize)
            .max(1);

        let builder = TreeBuilder {
            rows: &rows,
            targets: &targets,
            params: &self.params,
            features_per_split,
        };
        let n = rows.len();
        let seed = self.params.random_state;
        let bootstrap = self.params.bootstrap;

        self.trees = (0..self.params.n_estimators)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let samples: Vec<usize> = if bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                builder.build(&samples, 0, &mut rng)
            })
            .collect();
        self.num_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>, RegressionError> {
        if self.trees.is_empty() {
            return Err(RegressionError::NotFitted);
        }
        check_features(self.num_features, x)?;
        let values: Vec<f64> = x
            .row_iter()
            .map(|r| {
                let row: Vec<f64> = r.iter().copied().collect();
                self.trees.iter().map(|t| t.predict(&row)).sum::<f64>() / self.trees.len() as f64
            })
            .collect();
        Ok(DVector::from_vec(values))
    }
}
