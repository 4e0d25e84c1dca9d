//! Compare command implementation

use resampler_common::cli::styles;
use resampler_common::{LogLevel, OutputFormat};

use super::{load_config, open_session, print_json};
use crate::cli::report::leaderboard_table;
use crate::config::CompareArgs;
use crate::evaluate::compare_families;

pub fn run_compare(
    args: &CompareArgs,
    output: &resampler_common::Cli,
) -> resampler_common::Result<()> {
    let config = load_config(&args.source, &args.overrides())?;
    let candidates = config.candidates();
    let metric = config.metric;
    let session = open_session(config, output)?;

    output.log(
        LogLevel::Normal,
        &styles::header(&format!(
            "Comparing {} families: {}",
            candidates.len(),
            session.formula
        )),
    );
    for candidate in &candidates {
        output.log(
            LogLevel::Verbose,
            &format!("  {}: {} combinations", candidate.family.kind(), candidate.grid.len()),
        );
    }

    let board = compare_families(
        &session.split,
        &session.folds,
        &candidates,
        &session.formula,
        metric,
        session.config.tune_options(),
    )?;

    if output.format == OutputFormat::Json {
        return print_json(&board);
    }

    for skipped in &board.skipped {
        output.log(
            LogLevel::Normal,
            &styles::warning(&format!("{} skipped: {}", skipped.kind, skipped.reason)),
        );
    }
    println!("{}", leaderboard_table(&board));
    if let Some(winner) = board.best() {
        output.log(
            LogLevel::Normal,
            &styles::success(&format!("Best by test {metric}: {} ({})", winner.kind, winner.best)),
        );
    }
    Ok(())
}
