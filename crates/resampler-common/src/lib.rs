//! Shared infrastructure for resampler CLI tools.
//!
//! This crate provides the pieces every resampler front end needs:
//! - CLI styling and leveled output
//! - Error handling with actionable diagnostics
//! - Table rendering for terminal output

pub mod cli;
pub mod error;
pub mod output;

pub use cli::{Cli, CommonArgs, LogLevel, OutputFormat};
pub use error::{Result, ToolError};
pub use output::{Table, TableBuilder};
