//! Ordinary least squares with intercept
//!
//! Fitting delegates to [`aprender::linear_model::LinearRegression`]. The
//! design is centered in `f64` before narrowing to aprender's `f32` matrices,
//! and the intercept is recovered on the original scale afterwards.

use aprender::primitives::{Matrix, Vector};
use aprender::traits::Estimator;
use ndarray::{Array1, ArrayView1, Axis};

use super::{Fitted, ModelFamily, ModelKind};
use crate::dataset::Design;
use crate::error::FitError;
use crate::grid::{Combination, HyperparamGrid};

/// Linear regression; no hyperparameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRegression;

/// Intercept plus one coefficient per predictor.
#[derive(Debug, Clone)]
pub struct LinearFit {
    pub intercept: f64,
    pub coefficients: Array1<f64>,
}

impl Fitted for LinearFit {
    fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.intercept + self.coefficients.dot(&row)
    }
}

impl ModelFamily for LinearRegression {
    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }

    fn hyperparameters(&self) -> &'static [&'static str] {
        &[]
    }

    fn default_grid(&self) -> HyperparamGrid {
        HyperparamGrid::single()
    }

    fn fit(
        &self,
        design: &Design,
        _combination: &Combination,
    ) -> Result<Box<dyn Fitted>, FitError> {
        Ok(Box::new(LinearFit::fit(design)?))
    }
}

impl LinearFit {
    /// Least-squares fit of `y` on the predictors plus an intercept.
    pub fn fit(design: &Design) -> Result<Self, FitError> {
        let (n, p) = design.x.dim();
        if n < p + 1 {
            return Err(FitError::new(format!(
                "{n} rows cannot determine {} coefficients",
                p + 1
            )));
        }

        let x_mean = design
            .x
            .mean_axis(Axis(0))
            .ok_or_else(|| FitError::new("cannot center an empty design"))?;
        let y_mean = design.y.mean().unwrap_or(0.0);
        let centered = &design.x - &x_mean;

        let data: Vec<f32> = centered.iter().map(|&v| v as f32).collect();
        let x = Matrix::from_vec(n, p, data)
            .map_err(|_| FitError::new(format!("cannot shape {n} x {p} design")))?;
        let target: Vec<f32> = design.y.iter().map(|&v| (v - y_mean) as f32).collect();
        let y = Vector::from_vec(target);

        let mut ols = aprender::linear_model::LinearRegression::new();
        ols.fit(&x, &y).map_err(|e| FitError::new(format!("least squares failed: {e}")))?;

        let coefficients: Array1<f64> =
            ols.coefficients().as_slice().iter().map(|&c| f64::from(c)).collect();
        if coefficients.len() != p || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(FitError::new(
                "design matrix is singular (collinear or constant predictors)",
            ));
        }
        let intercept = y_mean + f64::from(ols.intercept()) - coefficients.dot(&x_mean);
        Ok(Self { intercept, coefficients })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    fn design(x: Array2<f64>, y: Array1<f64>) -> Design {
        let predictors = (0..x.ncols()).map(|i| format!("x{i}")).collect();
        Design { x, y, predictors }
    }

    #[test]
    fn test_recovers_exact_plane() {
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, 3.0], [4.0, 1.0]];
        let y = x.rows().into_iter().map(|r| 1.5 + 2.0 * r[0] - 0.5 * r[1]).collect();
        let fit = LinearFit::fit(&design(x, y)).unwrap();
        assert_relative_eq!(fit.intercept, 1.5, epsilon = 1e-3);
        assert_relative_eq!(fit.coefficients[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(fit.coefficients[1], -0.5, epsilon = 1e-3);
        assert_relative_eq!(fit.predict(array![1.0, 2.0].view()), 2.5, epsilon = 1e-3);
    }

    #[test]
    fn test_intercept_on_original_scale() {
        // offsets far from zero exercise the centering
        let x = array![[100.0], [101.0], [102.0], [103.0], [104.0]];
        let y = x.column(0).mapv(|v| 40.0 - 0.25 * v);
        let fit = LinearFit::fit(&design(x, y)).unwrap();
        assert_relative_eq!(fit.coefficients[0], -0.25, epsilon = 1e-3);
        assert_relative_eq!(fit.predict(array![110.0].view()), 12.5, epsilon = 1e-2);
    }

    #[test]
    fn test_too_few_rows() {
        let x = array![[1.0, 2.0]];
        let err = LinearFit::fit(&design(x, array![3.0])).unwrap_err();
        assert!(err.message.contains("cannot determine"));
    }

    #[test]
    fn test_family_fit_predicts() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![1.0, 3.0, 5.0, 7.0];
        let d = design(x, y);
        let model = LinearRegression.fit(&d, &Combination::new()).unwrap();
        let preds = model.predict_design(&d);
        for (p, o) in preds.iter().zip(d.y.iter()) {
            assert_relative_eq!(p, o, epsilon = 1e-3);
        }
    }
}
