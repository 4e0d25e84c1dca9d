//! Evaluate command implementation

use serde::Serialize;
use std::collections::BTreeMap;

use resampler_common::cli::styles;
use resampler_common::{LogLevel, OutputFormat, ToolError};

use super::{load_config, open_session, print_json};
use crate::cli::report::{metrics_table, summary_table, top_table};
use crate::config::EvaluateArgs;
use crate::error::EvalError;
use crate::evaluate::{aggregate, final_fit, select_best, show_best, tune_grid_with, Summary};
use crate::grid::Combination;
use crate::metric::Metric;
use crate::model::ModelKind;

#[derive(Serialize)]
struct EvaluateReport<'a> {
    model: ModelKind,
    formula: String,
    records: usize,
    dropped: usize,
    train: usize,
    test: usize,
    folds: usize,
    seed: u64,
    metric: Metric,
    summary: &'a Summary,
    best: BTreeMap<Metric, Combination>,
    failures: Vec<String>,
    final_fit: Option<BTreeMap<Metric, f64>>,
}

pub fn run_evaluate(
    args: &EvaluateArgs,
    output: &resampler_common::Cli,
) -> resampler_common::Result<()> {
    let config = load_config(&args.source, &args.overrides())?;
    if config.models.len() != 1 {
        return Err(ToolError::ConfigValue {
            field: "models".into(),
            message: format!("evaluate tunes one family, {} configured", config.models.len()),
            suggestion: "Pass --model, or use the compare command for several families".into(),
        });
    }
    let candidate = config.candidates().remove(0);
    let metric = config.metric;
    let session = open_session(config, output)?;
    let kind = candidate.family.kind();

    output.log(
        LogLevel::Normal,
        &styles::header(&format!("Tuning {kind}: {}", session.formula)),
    );
    output.log(
        LogLevel::Verbose,
        &format!(
            "{} combinations × {} folds = {} fits",
            candidate.grid.len(),
            session.folds.v(),
            candidate.grid.len() * session.folds.v()
        ),
    );

    let results = tune_grid_with(
        &session.split.train,
        &session.folds,
        &*candidate.family,
        &candidate.grid,
        &session.formula,
        session.config.tune_options(),
    )?;
    let failures: Vec<EvalError> = results.failures().collect();
    if !failures.is_empty() {
        output.log(
            LogLevel::Normal,
            &styles::warning(&format!("{} of {} fits failed", failures.len(), results.len())),
        );
        for failure in &failures {
            output.log(LogLevel::Verbose, &format!("  {failure}"));
        }
    }

    let summary = aggregate(&results);
    let mut best = BTreeMap::new();
    let mut best_index = BTreeMap::new();
    for m in Metric::ALL {
        if let Ok(combination) = select_best(&summary, m, m.direction()) {
            let grid = results.grid.combinations();
            if let Some(index) = grid.iter().position(|c| *c == combination) {
                best_index.insert(m, index);
            }
            best.insert(m, combination);
        }
    }

    let chosen = best
        .get(&metric)
        .cloned()
        .ok_or_else(|| EvalError::EmptySummary { metric: metric.to_string() })?;
    let fit = match final_fit(&session.split, &*candidate.family, &chosen, &session.formula) {
        Ok(fit) => Some(fit.metrics),
        Err(e @ EvalError::ModelFit { .. }) => {
            output.log(LogLevel::Normal, &styles::warning(&e.to_string()));
            None
        }
        Err(e) => return Err(e.into()),
    };

    if output.format == OutputFormat::Json {
        return print_json(&EvaluateReport {
            model: kind,
            formula: session.formula.to_string(),
            records: session.loaded,
            dropped: session.dropped,
            train: session.split.train.len(),
            test: session.split.test.len(),
            folds: session.folds.v(),
            seed: session.config.resampling.seed,
            metric,
            summary: &summary,
            best,
            failures: failures.iter().map(ToString::to_string).collect(),
            final_fit: fit,
        });
    }

    println!("{}", summary_table(&summary, &best_index));
    if !output.is_quiet() {
        for (m, combination) in &best {
            println!("Best by {m}: {combination}");
        }
        println!();
        println!("Top {} by {metric}:", args.top);
        println!("{}", top_table(&show_best(&summary, metric, metric.direction(), args.top)));
    }
    if let Some(metrics) = fit {
        output.log(LogLevel::Normal, &styles::success(&format!("Test set, {chosen}:")));
        println!("{}", metrics_table(&metrics));
    }
    Ok(())
}
