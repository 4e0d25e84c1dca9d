//! Error types with actionable diagnostics.
//!
//! Every variant carries enough context for the user to fix the problem
//! without reading the source: what went wrong, where, and what to try.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for resampler tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors surfaced by resampler command-line tools.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Configuration file not found at expected path.
    #[error("Configuration file not found: {path}\n  → Create a config file or pass --config with a different path")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file has invalid syntax.
    #[error("Invalid configuration syntax in {path}:\n  {message}\n  → Check the YAML syntax at the indicated line")]
    ConfigParsing { path: PathBuf, message: String },

    /// Configuration value is invalid.
    #[error("Invalid configuration value for '{field}': {message}\n  → {suggestion}")]
    ConfigValue { field: String, message: String, suggestion: String },

    /// Dataset file not found.
    #[error("Dataset not found: {path}\n  → Check the --data path")]
    DatasetNotFound { path: PathBuf },

    /// Dataset could not be parsed.
    #[error("Invalid dataset at line {line}: {message}\n  → Cells must be numeric, empty, or NA")]
    DatasetParsing { line: u64, message: String },

    /// Failure reported by the evaluation pipeline.
    #[error("Evaluation failed [{code}]: {message}")]
    Evaluation { code: &'static str, message: String },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic error for unexpected conditions.
    #[error("Internal error: {message}\n  → Please report this bug with the command line that produced it")]
    Internal { message: String },
}

impl ToolError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Check if this error is user-recoverable.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigParsing { .. }
                | Self::ConfigValue { .. }
                | Self::DatasetNotFound { .. }
                | Self::DatasetParsing { .. }
                | Self::Evaluation { .. }
        )
    }

    /// Get the error code for structured output.
    ///
    /// Evaluation errors keep the code assigned by the pipeline.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "E001",
            Self::ConfigParsing { .. } => "E002",
            Self::ConfigValue { .. } => "E003",
            Self::DatasetNotFound { .. } => "E010",
            Self::DatasetParsing { .. } => "E011",
            Self::Evaluation { code, .. } => code,
            Self::Io { .. } => "E050",
            Self::Serialization { .. } => "E051",
            Self::Internal { .. } => "E999",
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization { message: err.to_string() }
    }
}
