//! CLI command implementations

mod compare;
mod evaluate;

use resampler_common::cli::styles;
use resampler_common::LogLevel;

use crate::config::{Cli, Command, EvalConfig, Overrides, SourceArgs};
use crate::dataset::{Dataset, Formula};
use crate::resample::{make_folds, split, FoldAssignment, Split};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> resampler_common::Result<()> {
    let output = cli.common.to_cli();

    match cli.command {
        Command::Evaluate(args) => evaluate::run_evaluate(&args, &output),
        Command::Compare(args) => compare::run_compare(&args, &output),
    }
}

/// Loaded, split and folded data shared by every command.
struct Session {
    config: EvalConfig,
    formula: Formula,
    loaded: usize,
    dropped: usize,
    split: Split,
    folds: FoldAssignment,
}

fn load_config(
    source: &SourceArgs,
    overrides: &Overrides,
) -> resampler_common::Result<EvalConfig> {
    let mut config = match &source.config {
        Some(path) => EvalConfig::from_file(path)?,
        None => EvalConfig::default(),
    };
    config.apply_overrides(overrides);
    config.validate()?;
    Ok(config)
}

fn open_session(
    config: EvalConfig,
    output: &resampler_common::Cli,
) -> resampler_common::Result<Session> {
    let formula = config.formula()?;
    let path = config.data_path()?;
    let dataset = Dataset::from_csv_path(path)?;
    let complete = dataset.complete_cases(&formula)?;
    let dropped = dataset.len() - complete.len();

    output.log(
        LogLevel::Normal,
        &styles::info(&format!(
            "Loaded {} records from {} ({dropped} dropped for missing values)",
            dataset.len(),
            path.display()
        )),
    );

    let resampling = &config.resampling;
    let split = split(&complete, resampling.train_fraction, resampling.seed)?;
    let folds = make_folds(&split.train, resampling.folds, resampling.seed)?;
    output.log(
        LogLevel::Normal,
        &styles::info(&format!(
            "Split {} train / {} test, {} folds (seed {})",
            split.train.len(),
            split.test.len(),
            folds.v(),
            resampling.seed
        )),
    );

    Ok(Session { loaded: dataset.len(), dropped, formula, split, folds, config })
}

fn print_json<T: serde::Serialize>(value: &T) -> resampler_common::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
