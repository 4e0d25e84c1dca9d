//! k-nearest-neighbors regression on standardized predictors

use ndarray::{Array1, Array2, ArrayView1, Axis};

use super::{count_param, int_axis, Fitted, ModelFamily, ModelKind};
use crate::dataset::Design;
use crate::error::FitError;
use crate::grid::{Combination, HyperparamGrid};

const DEFAULT_NEIGHBORS: usize = 5;

/// KNN regression; hyperparameter `neighbors`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbors;

/// Stored standardized training set.
#[derive(Debug, Clone)]
pub struct KnnFit {
    k: usize,
    mean: Array1<f64>,
    scale: Array1<f64>,
    x: Array2<f64>,
    y: Array1<f64>,
}

impl ModelFamily for NearestNeighbors {
    fn kind(&self) -> ModelKind {
        ModelKind::Knn
    }

    fn hyperparameters(&self) -> &'static [&'static str] {
        &["neighbors"]
    }

    fn default_grid(&self) -> HyperparamGrid {
        HyperparamGrid::from_axes(&[int_axis("neighbors", &[3, 5, 10, 15, 20])])
    }

    fn fit(
        &self,
        design: &Design,
        combination: &Combination,
    ) -> Result<Box<dyn Fitted>, FitError> {
        let k = count_param(combination, "neighbors", DEFAULT_NEIGHBORS)?;
        Ok(Box::new(KnnFit::fit(design, k)?))
    }
}

impl KnnFit {
    pub fn fit(design: &Design, k: usize) -> Result<Self, FitError> {
        let n = design.n_rows();
        if k > n {
            return Err(FitError::new(format!(
                "neighbors={k} exceeds the {n} training rows"
            )));
        }

        let mean = design
            .x
            .mean_axis(Axis(0))
            .ok_or_else(|| FitError::new("no training rows"))?;
        // constant columns keep their raw scale
        let scale = if n > 1 {
            design.x.std_axis(Axis(0), 1.0).mapv(|s| if s > 0.0 { s } else { 1.0 })
        } else {
            Array1::ones(design.n_predictors())
        };
        let x = (&design.x - &mean) / &scale;

        Ok(Self { k, mean, scale, x, y: design.y.clone() })
    }
}

impl Fitted for KnnFit {
    fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        let query = (&row - &self.mean) / &self.scale;
        let mut distances: Vec<(f64, usize)> = self
            .x
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, train)| {
                let d2: f64 = train.iter().zip(query.iter()).map(|(a, b)| (a - b).powi(2)).sum();
                (d2, i)
            })
            .collect();
        // index breaks distance ties so predictions are deterministic
        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        distances[..self.k].iter().map(|&(_, i)| self.y[i]).sum::<f64>() / self.k as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn line() -> Design {
        Design {
            x: array![[0.0], [1.0], [2.0], [3.0], [10.0]],
            y: array![0.0, 10.0, 20.0, 30.0, 100.0],
            predictors: vec!["x".into()],
        }
    }

    #[test]
    fn test_one_neighbor_memorizes() {
        let fit = KnnFit::fit(&line(), 1).unwrap();
        assert_relative_eq!(fit.predict(array![2.0].view()), 20.0);
        assert_relative_eq!(fit.predict(array![2.4].view()), 20.0);
    }

    #[test]
    fn test_averages_k_nearest() {
        let fit = KnnFit::fit(&line(), 3).unwrap();
        // nearest to 1.0 are 1, 0, 2
        assert_relative_eq!(fit.predict(array![1.0].view()), 10.0);
    }

    #[test]
    fn test_k_larger_than_training_set() {
        let err = KnnFit::fit(&line(), 6).unwrap_err();
        assert!(err.message.contains("neighbors=6"));
    }

    #[test]
    fn test_standardization_balances_scales() {
        // second column is huge but constant within the near group
        let d = Design {
            x: array![[0.0, 1000.0], [1.0, 1000.0], [0.1, 5000.0]],
            y: array![1.0, 2.0, 3.0],
            predictors: vec!["a".into(), "b".into()],
        };
        let fit = KnnFit::fit(&d, 1).unwrap();
        assert_relative_eq!(fit.predict(array![0.9, 1000.0].view()), 2.0);
    }

    #[test]
    fn test_family_reads_neighbors() {
        let c = Combination::new().with("neighbors", crate::grid::ParameterValue::Int(5));
        let model = NearestNeighbors.fit(&line(), &c).unwrap();
        assert_relative_eq!(model.predict(array![0.0].view()), 32.0);
    }
}
