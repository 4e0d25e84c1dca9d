//! Model families behind a common fitting interface
//!
//! The evaluator only sees [`ModelFamily`] and [`Fitted`]; each family owns
//! its hyperparameter names, defaults, and training algorithm.

mod forest;
mod knn;
mod linear;
mod tree;

pub use forest::RandomForest;
pub use knn::NearestNeighbors;
pub use linear::LinearRegression;
pub use tree::DecisionTree;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dataset::Design;
use crate::error::{EvalError, FitError, Result};
use crate::grid::{Combination, HyperparamGrid, ParameterValue};

/// A trained model; dropped once its predictions are scored.
pub trait Fitted: Send + Sync {
    /// Predict the target for one predictor row.
    fn predict(&self, row: ArrayView1<'_, f64>) -> f64;

    /// Predict every row of `design`.
    fn predict_design(&self, design: &Design) -> Vec<f64> {
        design.x.rows().into_iter().map(|row| self.predict(row)).collect()
    }
}

/// A trainable model family with declared hyperparameters.
pub trait ModelFamily: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Hyperparameter names this family accepts.
    fn hyperparameters(&self) -> &'static [&'static str];

    /// Grid used when none is given.
    fn default_grid(&self) -> HyperparamGrid;

    /// Fit on `design` with `combination`; missing values take defaults.
    fn fit(
        &self,
        design: &Design,
        combination: &Combination,
    ) -> std::result::Result<Box<dyn Fitted>, FitError>;

    /// Reject unknown names and out-of-range values before any fitting.
    fn check(&self, combination: &Combination) -> Result<()> {
        let accepted = self.hyperparameters();
        for name in combination.names() {
            if !accepted.contains(&name) {
                let expected = if accepted.is_empty() {
                    "none".to_string()
                } else {
                    accepted.join(", ")
                };
                return Err(EvalError::invalid(format!(
                    "{} does not accept hyperparameter '{name}' (accepts: {expected})",
                    self.kind()
                )));
            }
        }
        for name in accepted {
            if combination.get(name).is_some() {
                count_param(combination, name, 1).map_err(|e| EvalError::invalid(e.message))?;
            }
        }
        Ok(())
    }
}

/// Built-in model families, by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linear,
    Knn,
    Tree,
    Forest,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] =
        [ModelKind::Linear, ModelKind::Knn, ModelKind::Tree, ModelKind::Forest];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Knn => "knn",
            ModelKind::Tree => "tree",
            ModelKind::Forest => "forest",
        }
    }

    /// Instantiate the family; `seed` drives any randomness it uses.
    pub fn family(&self, seed: u64) -> Box<dyn ModelFamily> {
        match self {
            ModelKind::Linear => Box::new(LinearRegression),
            ModelKind::Knn => Box::new(NearestNeighbors),
            ModelKind::Tree => Box::new(DecisionTree),
            ModelKind::Forest => Box::new(RandomForest::new(seed)),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linear" | "lm" => Ok(ModelKind::Linear),
            "knn" | "nearest_neighbor" => Ok(ModelKind::Knn),
            "tree" | "decision_tree" => Ok(ModelKind::Tree),
            "forest" | "rand_forest" => Ok(ModelKind::Forest),
            _ => Err(EvalError::invalid(format!(
                "unknown model family '{s}'. Use: linear, knn, tree, forest"
            ))),
        }
    }
}

/// Read a positive integer hyperparameter, falling back to `default`.
pub(crate) fn count_param(
    combination: &Combination,
    name: &str,
    default: usize,
) -> std::result::Result<usize, FitError> {
    match combination.get(name) {
        None => Ok(default),
        Some(value) => match value.as_int() {
            Some(v) if v >= 1 => Ok(v as usize),
            _ => Err(FitError::new(format!("{name} must be a positive integer, got {value}"))),
        },
    }
}

/// Integer axis for default grids.
pub(crate) fn int_axis(name: &str, values: &[i64]) -> (String, Vec<ParameterValue>) {
    (name.to_string(), values.iter().copied().map(ParameterValue::Int).collect())
}
