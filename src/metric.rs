//! Regression metrics and optimization direction

use aprender::primitives::Vector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EvalError;

/// Regression metric computed on held-out predictions.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Root mean squared error
    #[default]
    Rmse,
    /// Coefficient of determination, `1 - SS_res / SS_tot`
    Rsq,
    /// Mean absolute error
    Mae,
}

impl Metric {
    /// Every metric recorded per fold, in summary order.
    pub const ALL: [Metric; 3] = [Metric::Rmse, Metric::Rsq, Metric::Mae];

    /// Whether higher values are better for this metric
    pub fn higher_is_better(&self) -> bool {
        matches!(self, Metric::Rsq)
    }

    /// Direction that optimizes this metric.
    pub fn direction(&self) -> Direction {
        if self.higher_is_better() {
            Direction::Maximize
        } else {
            Direction::Minimize
        }
    }

    /// Get metric name as string
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Rmse => "rmse",
            Metric::Rsq => "rsq",
            Metric::Mae => "mae",
        }
    }

    /// Score `predicted` against `observed`.
    ///
    /// Delegates to [`aprender::metrics`], which works in `f32`. Empty input
    /// yields NaN. `rsq` is NaN when the observed values have no variance.
    pub fn compute(&self, observed: &[f64], predicted: &[f64]) -> f64 {
        let n = observed.len().min(predicted.len());
        if n == 0 {
            return f64::NAN;
        }
        let (observed, predicted) = (&observed[..n], &predicted[..n]);
        let y_true = to_vector(observed);
        let y_pred = to_vector(predicted);

        let value = match self {
            Metric::Rmse => aprender::metrics::rmse(&y_pred, &y_true),
            Metric::Mae => aprender::metrics::mae(&y_pred, &y_true),
            Metric::Rsq => {
                // aprender scores a constant target as 0.0
                if observed.iter().all(|&o| o == observed[0]) {
                    return f64::NAN;
                }
                aprender::metrics::r_squared(&y_pred, &y_true)
            }
        };
        f64::from(value)
    }
}

/// Narrow to the `f32` vectors aprender scores.
fn to_vector(values: &[f64]) -> Vector<f32> {
    Vector::from_vec(values.iter().map(|&v| v as f32).collect())
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rmse" => Ok(Metric::Rmse),
            "rsq" | "r2" => Ok(Metric::Rsq),
            "mae" => Ok(Metric::Mae),
            _ => Err(EvalError::invalid(format!("unknown metric '{s}'. Use: rmse, rsq, mae"))),
        }
    }
}

/// Whether the best combination has the smallest or largest mean.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Minimize,
    Maximize,
}

impl Direction {
    /// Whether `candidate` strictly beats `incumbent`.
    pub fn improves(&self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Minimize => candidate < incumbent,
            Direction::Maximize => candidate > incumbent,
        }
    }
}

impl FromStr for Direction {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "min" | "minimize" => Ok(Direction::Minimize),
            "max" | "maximize" => Ok(Direction::Maximize),
            _ => Err(EvalError::invalid(format!("unknown direction '{s}'. Use: min, max"))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Minimize => f.write_str("min"),
            Direction::Maximize => f.write_str("max"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rmse_and_mae() {
        let obs = [1.0, 2.0, 3.0, 4.0];
        let pred = [1.0, 2.0, 3.0, 6.0];
        assert_relative_eq!(Metric::Rmse.compute(&obs, &pred), 1.0, epsilon = 1e-6);
        assert_relative_eq!(Metric::Mae.compute(&obs, &pred), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_rsq() {
        let obs = [1.0, 2.0, 3.0];
        assert_relative_eq!(Metric::Rsq.compute(&obs, &obs), 1.0, epsilon = 1e-6);
        // predicting the mean explains nothing
        assert_relative_eq!(Metric::Rsq.compute(&obs, &[2.0, 2.0, 2.0]), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rsq_constant_target_is_nan() {
        assert!(Metric::Rsq.compute(&[5.0, 5.0], &[4.0, 6.0]).is_nan());
    }

    #[test]
    fn test_uneven_lengths_score_common_prefix() {
        let obs = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(Metric::Mae.compute(&obs, &[2.0, 3.0]), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_is_nan() {
        assert!(Metric::Rmse.compute(&[], &[]).is_nan());
    }

    #[test]
    fn test_direction() {
        assert_eq!(Metric::Rmse.direction(), Direction::Minimize);
        assert_eq!(Metric::Rsq.direction(), Direction::Maximize);
        assert!(Direction::Minimize.improves(1.0, 2.0));
        assert!(!Direction::Minimize.improves(2.0, 2.0));
        assert!(Direction::Maximize.improves(0.9, 0.8));
    }

    #[test]
    fn test_parse() {
        assert_eq!("RMSE".parse::<Metric>().unwrap(), Metric::Rmse);
        assert_eq!("r2".parse::<Metric>().unwrap(), Metric::Rsq);
        assert!("auc".parse::<Metric>().is_err());
        assert_eq!("max".parse::<Direction>().unwrap(), Direction::Maximize);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Metric::Mae).unwrap(), "\"mae\"");
    }
}
