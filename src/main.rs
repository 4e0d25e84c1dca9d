//! Resampler CLI
//!
//! # Usage
//!
//! ```bash
//! # Tune k-nearest-neighbors over a grid with 5-fold cross-validation
//! resampler evaluate --data air.csv --formula "pm25 ~ cmaq + aod" \
//!     --model knn --grid "neighbors=3,5,10" --folds 5
//!
//! # Compare every family with its default grid, settings from a file
//! resampler compare --config eval.yaml --format json
//! ```

use clap::Parser;
use resampler::cli::{run_command, Cli};
use resampler_common::cli::styles;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", styles::error(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}
