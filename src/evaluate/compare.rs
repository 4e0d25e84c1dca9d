//! Cross-family comparison on shared resamples

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::summary::best_row;
use super::{aggregate, final_fit, tune_grid_with, TuneOptions};
use crate::dataset::Formula;
use crate::error::{EvalError, Result};
use crate::grid::{Combination, HyperparamGrid};
use crate::metric::{Direction, Metric};
use crate::model::{ModelFamily, ModelKind};
use crate::resample::{FoldAssignment, Split};

/// A model family and the grid to tune it over.
pub struct Candidate {
    pub family: Box<dyn ModelFamily>,
    pub grid: HyperparamGrid,
}

impl Candidate {
    /// Candidate using the family's own default grid.
    pub fn with_default_grid(family: Box<dyn ModelFamily>) -> Self {
        let grid = family.default_grid();
        Self { family, grid }
    }
}

/// Best tuned combination of one family and its test-set metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub kind: ModelKind,
    pub best: Combination,
    /// Cross-validated mean of the ranking metric
    pub cv_mean: f64,
    pub cv_std_err: f64,
    pub test: BTreeMap<Metric, f64>,
}

impl LeaderboardEntry {
    pub fn test_score(&self, metric: Metric) -> f64 {
        self.test.get(&metric).copied().unwrap_or(f64::NAN)
    }
}

/// Family that produced no usable result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFamily {
    pub kind: ModelKind,
    pub reason: String,
}

/// Families ranked by the test-set value of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub metric: Metric,
    pub entries: Vec<LeaderboardEntry>,
    pub skipped: Vec<SkippedFamily>,
}

impl Leaderboard {
    fn new(metric: Metric) -> Self {
        Self { metric, entries: Vec::new(), skipped: Vec::new() }
    }

    /// Sort by the ranking metric; NaN scores go last, ties keep
    /// candidate order.
    fn sort(&mut self) {
        let metric = self.metric;
        let higher_is_better = metric.higher_is_better();
        self.entries.sort_by(|a, b| {
            let (sa, sb) = (a.test_score(metric), b.test_score(metric));
            match (sa.is_nan(), sb.is_nan()) {
                (true, true) => std::cmp::Ordering::Equal,
                (true, false) => std::cmp::Ordering::Greater,
                (false, true) => std::cmp::Ordering::Less,
                _ if higher_is_better => sb.total_cmp(&sa),
                _ => sa.total_cmp(&sb),
            }
        });
    }

    /// Top-ranked family.
    pub fn best(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }
}

/// Tune each candidate on the same folds, pick its best combination by
/// `metric`, refit it on the full training side, and rank the families by
/// test-set `metric`.
///
/// Every grid is validated before any fitting. A family whose grid fails on
/// every fold, or whose final fit fails, is listed under `skipped`.
pub fn compare_families(
    split: &Split,
    folds: &FoldAssignment,
    candidates: &[Candidate],
    formula: &Formula,
    metric: Metric,
    options: TuneOptions,
) -> Result<Leaderboard> {
    if candidates.is_empty() {
        return Err(EvalError::invalid("no model families to compare"));
    }
    for candidate in candidates {
        candidate.grid.ensure_not_empty()?;
        for combination in candidate.grid.combinations() {
            candidate.family.check(combination)?;
        }
    }

    let direction: Direction = metric.direction();
    let mut board = Leaderboard::new(metric);
    for candidate in candidates {
        let kind = candidate.family.kind();
        let results = tune_grid_with(
            &split.train,
            folds,
            &*candidate.family,
            &candidate.grid,
            formula,
            options,
        )?;
        let summary = aggregate(&results);
        let Some(row) = best_row(&summary, metric, direction) else {
            let reason = results
                .failures()
                .next()
                .map_or_else(|| format!("no finite {metric} on any fold"), |e| e.to_string());
            board.skipped.push(SkippedFamily { kind, reason });
            continue;
        };

        match final_fit(split, &*candidate.family, &row.combination, formula) {
            Ok(fit) => board.entries.push(LeaderboardEntry {
                kind,
                best: row.combination.clone(),
                cv_mean: row.mean,
                cv_std_err: row.std_err,
                test: fit.metrics,
            }),
            Err(e @ EvalError::ModelFit { .. }) => {
                board.skipped.push(SkippedFamily { kind, reason: e.to_string() })
            }
            Err(e) => return Err(e),
        }
    }

    board.sort();
    Ok(board)
}
