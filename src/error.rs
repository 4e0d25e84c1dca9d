//! Evaluation error types

use resampler_common::ToolError;
use thiserror::Error;

/// Errors raised by the resampling and tuning pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A split side or fold complement is empty, or a record lacks a field.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A parameter is out of range; raised before any fitting starts.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `select_best` found no aggregated rows for the requested metric.
    #[error("No aggregated results for metric '{metric}'")]
    EmptySummary { metric: String },

    /// A model family failed to fit, on a resampling fold or the final fit.
    #[error("Model fit failed for {combination}{}: {message}", fold_label(.fold))]
    ModelFit {
        combination: String,
        fold: Option<usize>,
        message: String,
    },
}

fn fold_label(fold: &Option<usize>) -> String {
    fold.map(|f| format!(" on fold {f}")).unwrap_or_default()
}

/// Result type for evaluation operations
pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    /// Shorthand for [`EvalError::InsufficientData`].
    pub fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    /// Shorthand for [`EvalError::InvalidConfiguration`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Stable error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientData(_) => "E101",
            Self::InvalidConfiguration(_) => "E102",
            Self::EmptySummary { .. } => "E103",
            Self::ModelFit { .. } => "E104",
        }
    }

    /// Whether the caller can fix this by changing inputs.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::ModelFit { .. })
    }
}

impl From<EvalError> for ToolError {
    fn from(err: EvalError) -> Self {
        ToolError::Evaluation { code: err.code(), message: err.to_string() }
    }
}

/// Failure reported by a model family's `fit`.
///
/// Carries only the message; the evaluator attaches the combination and
/// fold before surfacing it as [`EvalError::ModelFit`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct FitError {
    pub message: String,
}

impl FitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
