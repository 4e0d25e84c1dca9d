//! Result tables

use std::collections::BTreeMap;

use resampler_common::output::{format_metric, Align};
use resampler_common::{Table, TableBuilder};

use crate::evaluate::{Leaderboard, Summary, SummaryRow};
use crate::metric::Metric;

const PRECISION: usize = 4;
const BEST_MARK: &str = "★";

fn push_row(builder: TableBuilder, cells: &[String]) -> TableBuilder {
    builder.row(cells.iter().map(String::as_str).collect())
}

/// Every summary row; rows whose grid position is best for their metric
/// get a star.
pub fn summary_table(summary: &Summary, best: &BTreeMap<Metric, usize>) -> Table {
    let mut builder = TableBuilder::new()
        .headers(vec!["#", "Combination", "Metric", "Mean", "Std Err", "n", "Failed", ""])
        .align(vec![
            Align::Right,
            Align::Left,
            Align::Left,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Right,
            Align::Left,
        ]);
    for row in &summary.rows {
        let mark = if best.get(&row.metric) == Some(&row.grid_index) { BEST_MARK } else { "" };
        builder = push_row(
            builder,
            &[
                row.grid_index.to_string(),
                row.combination.to_string(),
                row.metric.to_string(),
                format_metric(row.mean, PRECISION),
                format_metric(row.std_err, PRECISION),
                row.n.to_string(),
                row.n_failed.to_string(),
                mark.to_string(),
            ],
        );
    }
    builder.build()
}

/// Ranked rows from `show_best`.
pub fn top_table(rows: &[SummaryRow]) -> Table {
    let mut builder = TableBuilder::new()
        .headers(vec!["Rank", "Combination", "Mean", "Std Err", "n"])
        .align(vec![Align::Right, Align::Left, Align::Right, Align::Right, Align::Right]);
    for (rank, row) in rows.iter().enumerate() {
        builder = push_row(
            builder,
            &[
                (rank + 1).to_string(),
                row.combination.to_string(),
                format_metric(row.mean, PRECISION),
                format_metric(row.std_err, PRECISION),
                row.n.to_string(),
            ],
        );
    }
    builder.build()
}

/// One line per metric.
pub fn metrics_table(metrics: &BTreeMap<Metric, f64>) -> Table {
    let mut builder = TableBuilder::new()
        .headers(vec!["Metric", "Value"])
        .align(vec![Align::Left, Align::Right]);
    for (metric, value) in metrics {
        builder = push_row(builder, &[metric.to_string(), format_metric(*value, PRECISION)]);
    }
    builder.build()
}

/// Families in rank order with their test-set metrics.
pub fn leaderboard_table(board: &Leaderboard) -> Table {
    let cv_header = format!("CV {}", board.metric);
    let mut headers = vec!["Rank", "Model", "Best Combination", cv_header.as_str()];
    let test_headers: Vec<String> = Metric::ALL.iter().map(|m| format!("Test {m}")).collect();
    headers.extend(test_headers.iter().map(String::as_str));

    let mut builder = TableBuilder::new().headers(headers).align(vec![
        Align::Right,
        Align::Left,
        Align::Left,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Right,
    ]);
    for (rank, entry) in board.entries.iter().enumerate() {
        let mut cells = vec![
            (rank + 1).to_string(),
            entry.kind.to_string(),
            entry.best.to_string(),
            format!(
                "{} ± {}",
                format_metric(entry.cv_mean, PRECISION),
                format_metric(entry.cv_std_err, PRECISION)
            ),
        ];
        cells.extend(Metric::ALL.iter().map(|m| format_metric(entry.test_score(*m), PRECISION)));
        builder = push_row(builder, &cells);
    }
    builder.build()
}
