//! CLI module for resampler
//!
//! Command handlers load configuration and data, run the evaluation
//! pipeline, and render results as tables or JSON.

mod commands;
mod report;

pub use commands::run_command;
pub use report::{leaderboard_table, metrics_table, summary_table, top_table};

// Re-export Cli from config for convenience
pub use crate::config::Cli;
