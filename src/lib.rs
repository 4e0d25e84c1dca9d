//! Resampled model evaluation for tabular regression.
//!
//! The pipeline splits a dataset once, assigns the training side to folds,
//! cross-validates every combination of a hyperparameter grid, and
//! aggregates fold metrics into a summary from which the best combination
//! is chosen:
//!
//! ```no_run
//! use resampler::dataset::{Dataset, Formula};
//! use resampler::evaluate::{aggregate, select_best, tune_grid};
//! use resampler::grid::HyperparamGrid;
//! use resampler::metric::{Direction, Metric};
//! use resampler::model::ModelKind;
//! use resampler::resample::{make_folds, split};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = Dataset::from_csv_path("air.csv")?;
//! let formula: Formula = "pm25 ~ cmaq + aod".parse()?;
//! let data = data.complete_cases(&formula)?;
//!
//! let split = split(&data, 0.75, 42)?;
//! let folds = make_folds(&split.train, 10, 42)?;
//! let knn = ModelKind::Knn.family(42);
//! let grid: HyperparamGrid = "neighbors=3,5,10".parse()?;
//!
//! let results = tune_grid(&split.train, &folds, &*knn, &grid, &formula)?;
//! let summary = aggregate(&results);
//! let best = select_best(&summary, Metric::Rmse, Direction::Minimize)?;
//! println!("best: {best}");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod grid;
pub mod metric;
pub mod model;
pub mod resample;

pub use error::{EvalError, FitError, Result};
