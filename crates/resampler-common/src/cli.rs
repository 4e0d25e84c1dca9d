//! Shared CLI arguments, output levels, and terminal styling.

use clap::Args;
use std::str::FromStr;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Box-drawn tables for humans
    #[default]
    Table,
    /// Pretty-printed JSON for scripts
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {s}. Use: table, json")),
        }
    }
}

/// Log level for CLI output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Suppress all output
    Quiet,
    /// Normal output level
    Normal,
    /// Verbose output with additional details
    Verbose,
}

/// Log a message if the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}

/// Arguments shared by every resampler command.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Show per-fold progress and failure details
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress everything except results
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format: table, json
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl CommonArgs {
    /// Resolve the parsed flags into a runtime [`Cli`] configuration.
    pub fn to_cli(&self) -> Cli {
        if self.no_color {
            colored::control::set_override(false);
        }
        let level = if self.quiet {
            LogLevel::Quiet
        } else if self.verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        };
        Cli { level, format: self.format }
    }
}

/// Runtime output configuration derived from [`CommonArgs`].
#[derive(Debug, Clone, Copy)]
pub struct Cli {
    /// Output verbosity
    pub level: LogLevel,
    /// Result format
    pub format: OutputFormat,
}

impl Default for Cli {
    fn default() -> Self {
        Self { level: LogLevel::Normal, format: OutputFormat::Table }
    }
}

impl Cli {
    /// Whether only results should be printed.
    pub fn is_quiet(&self) -> bool {
        self.level == LogLevel::Quiet
    }

    /// Whether diagnostic detail was requested.
    pub fn is_verbose(&self) -> bool {
        self.level == LogLevel::Verbose
    }

    /// Print `msg` when the configured level allows `required`.
    ///
    /// JSON output keeps stdout machine-readable, so progress lines are
    /// dropped in that mode.
    pub fn log(&self, required: LogLevel, msg: &str) {
        if self.format == OutputFormat::Json {
            return;
        }
        log(self.level, required, msg);
    }
}

/// Terminal styling helpers.
pub mod styles {
    use colored::Colorize;

    /// Section header.
    pub fn header(text: &str) -> String {
        format!("{}\n{}", text.bold().cyan(), "═".repeat(text.chars().count()).cyan())
    }

    /// Success line.
    pub fn success(text: &str) -> String {
        format!("{} {}", "✓".green().bold(), text.green())
    }

    /// Informational line.
    pub fn info(text: &str) -> String {
        format!("{} {}", "ℹ".blue(), text)
    }

    /// Warning line.
    pub fn warning(text: &str) -> String {
        format!("{} {}", "⚠".yellow().bold(), text.yellow())
    }

    /// Error line.
    pub fn error(text: &str) -> String {
        format!("{} {}", "✗".red().bold(), text.red())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_wins() {
        let args = CommonArgs { quiet: true, ..Default::default() };
        let cli = args.to_cli();
        assert!(cli.is_quiet());
        assert!(!cli.is_verbose());
    }

    #[test]
    fn test_verbose_level() {
        let args = CommonArgs { verbose: true, no_color: true, ..Default::default() };
        assert!(args.to_cli().is_verbose());
    }

    #[test]
    fn test_default_is_normal_table() {
        let cli = CommonArgs::default().to_cli();
        assert_eq!(cli.level, LogLevel::Normal);
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn test_styles_keep_text() {
        colored::control::set_override(false);
        assert!(styles::error("bad grid").contains("bad grid"));
        assert!(styles::warning("fold 3 failed").contains("fold 3 failed"));
        assert!(styles::header("Summary").starts_with("Summary"));
    }
}
