//! Random forest: bagged CART trees with per-node predictor sampling

use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use super::tree::{TreeFit, TreeParams};
use super::{count_param, int_axis, Fitted, ModelFamily, ModelKind};
use crate::dataset::Design;
use crate::error::FitError;
use crate::grid::{Combination, HyperparamGrid};

const DEFAULT_TREES: usize = 100;
const DEFAULT_MIN_N: usize = 5;
const MAX_DEPTH: usize = 64;
const MAX_TREES: usize = 10_000;

/// Random forest; hyperparameters `trees`, `mtry` and `min_n`.
///
/// Fits with the same seed, data and combination are identical.
#[derive(Debug, Clone, Copy)]
pub struct RandomForest {
    seed: u64,
}

impl RandomForest {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

/// Ensemble of trees; predicts their mean.
#[derive(Debug, Clone)]
pub struct ForestFit {
    trees: Vec<TreeFit>,
}

impl Fitted for ForestFit {
    fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        total / self.trees.len() as f64
    }
}

impl ModelFamily for RandomForest {
    fn kind(&self) -> ModelKind {
        ModelKind::Forest
    }

    fn hyperparameters(&self) -> &'static [&'static str] {
        &["trees", "mtry", "min_n"]
    }

    fn default_grid(&self) -> HyperparamGrid {
        HyperparamGrid::from_axes(&[
            int_axis("trees", &[100]),
            int_axis("mtry", &[1, 2, 3]),
            int_axis("min_n", &[2, 5, 10]),
        ])
    }

    fn fit(
        &self,
        design: &Design,
        combination: &Combination,
    ) -> Result<Box<dyn Fitted>, FitError> {
        let p = design.n_predictors();
        let n = design.n_rows();
        let trees = count_param(combination, "trees", DEFAULT_TREES)?;
        let mtry = count_param(combination, "mtry", (p / 3).max(1))?;
        let params = TreeParams {
            min_n: count_param(combination, "min_n", DEFAULT_MIN_N)?,
            max_depth: MAX_DEPTH,
        };
        if trees > MAX_TREES {
            return Err(FitError::new(format!("trees={trees} exceeds the limit of {MAX_TREES}")));
        }
        if mtry > p {
            return Err(FitError::new(format!("mtry={mtry} exceeds the {p} predictors")));
        }
        if n == 0 {
            return Err(FitError::new("no training rows"));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let trees = (0..trees)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                let mut sample_features =
                    |all: usize| index::sample(&mut rng, all, mtry).into_vec();
                TreeFit::grow(design, bootstrap, &params, &mut sample_features)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Box::new(ForestFit { trees }))
    }
}
