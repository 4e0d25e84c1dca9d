//! Resampled evaluation: cross-validation, grid tuning, and final fits
//!
//! Every (combination, fold) pair is an independent unit of work. Units are
//! mapped in parallel with rayon and collected in unit order, so parallel
//! and sequential runs return identical results.

mod compare;
mod summary;

pub use compare::{compare_families, Candidate, Leaderboard, LeaderboardEntry, SkippedFamily};
pub use summary::{aggregate, select_best, show_best, Summary, SummaryRow};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dataset::{Dataset, Design, Formula};
use crate::error::{EvalError, Result};
use crate::grid::{Combination, HyperparamGrid};
use crate::metric::Metric;
use crate::model::ModelFamily;
use crate::resample::{FoldAssignment, Split};

/// Execution options for grid tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuneOptions {
    /// Map work units on the rayon pool
    pub parallel: bool,
}

impl Default for TuneOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Result of one held-out fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FoldOutcome {
    Scored { metrics: BTreeMap<Metric, f64> },
    Failed { message: String },
}

/// Metrics of one combination on one held-out fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Position of the combination in its grid
    pub grid_index: usize,
    pub combination: Combination,
    pub fold: usize,
    pub outcome: FoldOutcome,
}

impl MetricRecord {
    /// Value of `metric`, if the fold was scored.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match &self.outcome {
            FoldOutcome::Scored { metrics } => metrics.get(&metric).copied(),
            FoldOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, FoldOutcome::Failed { .. })
    }

    /// The fit failure as an [`EvalError::ModelFit`].
    pub fn error(&self) -> Option<EvalError> {
        match &self.outcome {
            FoldOutcome::Failed { message } => Some(EvalError::ModelFit {
                combination: self.combination.to_string(),
                fold: Some(self.fold),
                message: message.clone(),
            }),
            FoldOutcome::Scored { .. } => None,
        }
    }
}

/// All metric records of a grid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridResults {
    pub grid: HyperparamGrid,
    pub v: usize,
    /// Ordered by grid position, then fold
    pub records: Vec<MetricRecord>,
}

impl GridResults {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fit failures, in record order.
    pub fn failures(&self) -> impl Iterator<Item = EvalError> + '_ {
        self.records.iter().filter_map(MetricRecord::error)
    }
}

/// Test-set performance of a combination fit on the whole training set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalFit {
    pub combination: Combination,
    pub metrics: BTreeMap<Metric, f64>,
    pub observed: Vec<f64>,
    pub predictions: Vec<f64>,
}

/// Score predictions on every metric.
pub fn score(observed: &[f64], predicted: &[f64]) -> BTreeMap<Metric, f64> {
    Metric::ALL.iter().map(|m| (*m, m.compute(observed, predicted))).collect()
}

/// Cross-validate one combination: fit on each fold's complement, score
/// the held-out fold. Returns one record per fold, in fold order.
///
/// Fit failures become failure-marked records.
///
/// # Errors
///
/// - [`EvalError::InvalidConfiguration`] if the family rejects `combination`
/// - [`EvalError::InsufficientData`] if `folds` does not partition `train`,
///   a fold complement is empty, or a record lacks a formula field
pub fn cross_validate(
    train: &Dataset,
    folds: &FoldAssignment,
    family: &dyn ModelFamily,
    combination: &Combination,
    formula: &Formula,
) -> Result<Vec<MetricRecord>> {
    family.check(combination)?;
    let design = prepare(train, folds, formula)?;
    Ok((0..folds.v())
        .map(|f| evaluate_fold(&design, folds, family, 0, combination, f))
        .collect())
}

/// Cross-validate every grid combination on the same folds, in parallel.
pub fn tune_grid(
    train: &Dataset,
    folds: &FoldAssignment,
    family: &dyn ModelFamily,
    grid: &HyperparamGrid,
    formula: &Formula,
) -> Result<GridResults> {
    tune_grid_with(train, folds, family, grid, formula, TuneOptions::default())
}

/// [`tune_grid`] with explicit execution options.
///
/// The grid and every combination are validated before any fitting.
pub fn tune_grid_with(
    train: &Dataset,
    folds: &FoldAssignment,
    family: &dyn ModelFamily,
    grid: &HyperparamGrid,
    formula: &Formula,
    options: TuneOptions,
) -> Result<GridResults> {
    grid.ensure_not_empty()?;
    for combination in grid.combinations() {
        family.check(combination)?;
    }
    let design = prepare(train, folds, formula)?;

    let units: Vec<(usize, usize)> = (0..grid.len())
        .flat_map(|g| (0..folds.v()).map(move |f| (g, f)))
        .collect();
    let run = |&(g, f): &(usize, usize)| {
        evaluate_fold(&design, folds, family, g, &grid.combinations()[g], f)
    };
    let records: Vec<MetricRecord> = if options.parallel {
        units.par_iter().map(run).collect()
    } else {
        units.iter().map(run).collect()
    };

    Ok(GridResults { grid: grid.clone(), v: folds.v(), records })
}

/// Fit `combination` on the full training side and score the test side.
///
/// # Errors
///
/// A fit failure is returned as [`EvalError::ModelFit`] with no fold.
pub fn final_fit(
    split: &Split,
    family: &dyn ModelFamily,
    combination: &Combination,
    formula: &Formula,
) -> Result<FinalFit> {
    family.check(combination)?;
    let train = split.train.design(formula)?;
    let test = split.test.design(formula)?;

    let model = family.fit(&train, combination).map_err(|e| EvalError::ModelFit {
        combination: combination.to_string(),
        fold: None,
        message: e.message,
    })?;
    let predictions = model.predict_design(&test);
    let observed = test.y.to_vec();

    Ok(FinalFit {
        combination: combination.clone(),
        metrics: score(&observed, &predictions),
        observed,
        predictions,
    })
}

fn prepare(train: &Dataset, folds: &FoldAssignment, formula: &Formula) -> Result<Design> {
    folds.check_covers(train.len())?;
    for f in 0..folds.v() {
        if folds.holdout(f).is_empty() {
            return Err(EvalError::insufficient(format!("fold {f} holds out no records")));
        }
        if folds.holdout(f).len() == train.len() {
            return Err(EvalError::insufficient(format!(
                "fold {f} holds out every record, leaving nothing to fit on"
            )));
        }
    }
    train.design(formula)
}

fn evaluate_fold(
    design: &Design,
    folds: &FoldAssignment,
    family: &dyn ModelFamily,
    grid_index: usize,
    combination: &Combination,
    fold: usize,
) -> MetricRecord {
    let analysis = design.select(&folds.complement(fold));
    let assessment = design.select(folds.holdout(fold));

    let outcome = match family.fit(&analysis, combination) {
        Ok(model) => {
            let predictions = model.predict_design(&assessment);
            FoldOutcome::Scored { metrics: score(&assessment.y.to_vec(), &predictions) }
        }
        Err(e) => FoldOutcome::Failed { message: e.message },
    };

    MetricRecord { grid_index, combination: combination.clone(), fold, outcome }
}
