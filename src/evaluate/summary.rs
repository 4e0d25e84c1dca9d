//! Aggregation of fold metrics and best-combination selection

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::GridResults;
use crate::error::{EvalError, Result};
use crate::grid::Combination;
use crate::metric::{Direction, Metric};

/// Mean and standard error of one metric for one combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub grid_index: usize,
    pub combination: Combination,
    pub metric: Metric,
    /// NaN when no fold produced a finite value
    pub mean: f64,
    pub std_err: f64,
    /// Folds contributing a finite value
    pub n: usize,
    /// Folds whose fit failed
    pub n_failed: usize,
}

/// Aggregated grid results, ordered by grid position then metric.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    /// Rows for one metric, in grid order.
    pub fn for_metric(&self, metric: Metric) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().filter(move |r| r.metric == metric)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Group records by (combination, metric) into mean and standard error.
///
/// Failed folds and non-finite values are left out of the statistics;
/// failures are counted in `n_failed`. Standard error is the sample standard
/// deviation over `sqrt(n)`, and 0 when a single fold contributes.
pub fn aggregate(results: &GridResults) -> Summary {
    let mut combinations: BTreeMap<usize, &Combination> = BTreeMap::new();
    let mut failed: BTreeMap<usize, usize> = BTreeMap::new();
    let mut values: BTreeMap<(usize, Metric), Vec<f64>> = BTreeMap::new();

    for record in &results.records {
        combinations.entry(record.grid_index).or_insert(&record.combination);
        let failures = failed.entry(record.grid_index).or_default();
        if record.is_failed() {
            *failures += 1;
            continue;
        }
        for metric in Metric::ALL {
            let slot = values.entry((record.grid_index, metric)).or_default();
            if let Some(v) = record.metric(metric).filter(|v| v.is_finite()) {
                slot.push(v);
            }
        }
    }

    let mut rows = Vec::new();
    for (&grid_index, &combination) in &combinations {
        for metric in Metric::ALL {
            let folds = values.get(&(grid_index, metric)).map(Vec::as_slice).unwrap_or(&[]);
            let (mean, std_err) = mean_std_err(folds);
            rows.push(SummaryRow {
                grid_index,
                combination: combination.clone(),
                metric,
                mean,
                std_err,
                n: folds.len(),
                n_failed: failed.get(&grid_index).copied().unwrap_or(0),
            });
        }
    }
    Summary { rows }
}

fn mean_std_err(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    match n {
        0 => (f64::NAN, f64::NAN),
        1 => (values[0], 0.0),
        _ => {
            let mean = values.iter().sum::<f64>() / n as f64;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            (mean, var.sqrt() / (n as f64).sqrt())
        }
    }
}

/// Combination with the best mean for `metric`.
///
/// Ties keep the earliest grid entry. Rows with a NaN mean never win.
///
/// # Errors
///
/// [`EvalError::EmptySummary`] if no row for `metric` has a finite mean.
pub fn select_best(summary: &Summary, metric: Metric, direction: Direction) -> Result<Combination> {
    best_row(summary, metric, direction)
        .map(|row| row.combination.clone())
        .ok_or_else(|| EvalError::EmptySummary { metric: metric.to_string() })
}

pub(crate) fn best_row(
    summary: &Summary,
    metric: Metric,
    direction: Direction,
) -> Option<&SummaryRow> {
    let mut best: Option<&SummaryRow> = None;
    for row in summary.for_metric(metric).filter(|r| r.mean.is_finite()) {
        if best.map_or(true, |b| direction.improves(row.mean, b.mean)) {
            best = Some(row);
        }
    }
    best
}

/// Top `n` rows for `metric`, best first; ties keep grid order.
pub fn show_best(
    summary: &Summary,
    metric: Metric,
    direction: Direction,
    n: usize,
) -> Vec<SummaryRow> {
    let mut rows: Vec<&SummaryRow> =
        summary.for_metric(metric).filter(|r| r.mean.is_finite()).collect();
    rows.sort_by(|a, b| {
        let order = a.mean.total_cmp(&b.mean);
        match direction {
            Direction::Minimize => order,
            Direction::Maximize => order.reverse(),
        }
    });
    rows.into_iter().take(n).cloned().collect()
}
