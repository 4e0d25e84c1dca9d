//! Evaluation configuration
//!
//! A YAML file maps onto [`EvalConfig`]; every section has defaults, so an
//! empty file is valid. Command-line flags are layered on top with
//! [`EvalConfig::apply_overrides`] and the result is checked with
//! [`EvalConfig::validate`] before any data is read.

mod args;

pub use args::{parse_args, Cli, Command, CompareArgs, EvaluateArgs, SourceArgs};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use resampler_common::ToolError;

use crate::dataset::Formula;
use crate::error::{EvalError, Result};
use crate::evaluate::{Candidate, TuneOptions};
use crate::grid::GridAxes;
use crate::metric::Metric;
use crate::model::ModelKind;
use crate::resample::DEFAULT_TRAIN_FRACTION;

/// Complete evaluation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Dataset location and formula
    #[serde(default)]
    pub data: DataConfig,
    /// Split and fold settings
    #[serde(default)]
    pub resampling: ResamplingConfig,
    /// Families to tune; empty means every built-in family
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    /// Metric used to pick the best combination
    #[serde(default)]
    pub metric: Metric,
    /// Run grid units on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            resampling: ResamplingConfig::default(),
            models: Vec::new(),
            metric: Metric::default(),
            parallel: default_parallel(),
        }
    }
}

/// Dataset configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV file with a header row
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Model formula, e.g. `pm25 ~ cmaq + aod`
    #[serde(default)]
    pub formula: Option<String>,
}

/// Resampling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResamplingConfig {
    /// Share of records used for training
    #[serde(default = "default_train_fraction")]
    pub train_fraction: f64,
    /// Number of cross-validation folds
    #[serde(default = "default_folds")]
    pub folds: usize,
    /// Seed for the split, the folds, and forest sampling
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ResamplingConfig {
    fn default() -> Self {
        Self {
            train_fraction: default_train_fraction(),
            folds: default_folds(),
            seed: default_seed(),
        }
    }
}

/// One model family and its grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub family: ModelKind,
    /// Omitted means the family's default grid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridAxes>,
}

fn default_parallel() -> bool {
    true
}

fn default_train_fraction() -> f64 {
    DEFAULT_TRAIN_FRACTION
}

fn default_folds() -> usize {
    10
}

fn default_seed() -> u64 {
    42
}

/// Command-line values that replace configuration values when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub data: Option<PathBuf>,
    pub formula: Option<String>,
    /// Replace the model list
    pub models: Vec<ModelKind>,
    /// Grid for every selected model
    pub grid: Option<GridAxes>,
    pub folds: Option<usize>,
    pub seed: Option<u64>,
    pub train_fraction: Option<f64>,
    pub metric: Option<Metric>,
    pub sequential: bool,
}

impl EvalConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> resampler_common::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ToolError::ConfigNotFound { path: path.to_path_buf() });
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ToolError::io(format!("reading config file: {}", path.display()), e))?;

        Self::from_yaml(&content, path)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(content: &str, path: &Path) -> resampler_common::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ToolError::ConfigParsing {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Layer command-line values over the file.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(data) = &overrides.data {
            self.data.path = Some(data.clone());
        }
        if let Some(formula) = &overrides.formula {
            self.data.formula = Some(formula.clone());
        }
        if !overrides.models.is_empty() {
            self.models = overrides
                .models
                .iter()
                .map(|&family| ModelConfig { family, grid: None })
                .collect();
        }
        if let Some(grid) = &overrides.grid {
            for model in &mut self.models {
                model.grid = Some(grid.clone());
            }
        }
        if let Some(folds) = overrides.folds {
            self.resampling.folds = folds;
        }
        if let Some(seed) = overrides.seed {
            self.resampling.seed = seed;
        }
        if let Some(fraction) = overrides.train_fraction {
            self.resampling.train_fraction = fraction;
        }
        if let Some(metric) = overrides.metric {
            self.metric = metric;
        }
        if overrides.sequential {
            self.parallel = false;
        }
    }

    /// Check every value that can be checked without reading the data.
    pub fn validate(&self) -> Result<()> {
        let fraction = self.resampling.train_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(EvalError::invalid(format!(
                "resampling.train_fraction must be strictly between 0 and 1, got {fraction}"
            )));
        }
        if self.resampling.folds < 2 {
            return Err(EvalError::invalid(format!(
                "resampling.folds must be at least 2, got {}",
                self.resampling.folds
            )));
        }
        self.data_path()?;
        self.formula()?;
        for candidate in self.candidates() {
            candidate.grid.ensure_not_empty()?;
            for combination in candidate.grid.combinations() {
                candidate.family.check(combination)?;
            }
        }
        Ok(())
    }

    pub fn data_path(&self) -> Result<&Path> {
        self.data
            .path
            .as_deref()
            .ok_or_else(|| EvalError::invalid("no dataset given; set data.path or pass --data"))
    }

    pub fn formula(&self) -> Result<Formula> {
        self.data
            .formula
            .as_deref()
            .ok_or_else(|| {
                EvalError::invalid("no formula given; set data.formula or pass --formula")
            })?
            .parse()
    }

    /// Families to tune with their grids, in configuration order.
    pub fn candidates(&self) -> Vec<Candidate> {
        let seed = self.resampling.seed;
        if self.models.is_empty() {
            return ModelKind::ALL
                .iter()
                .map(|kind| Candidate::with_default_grid(kind.family(seed)))
                .collect();
        }
        self.models
            .iter()
            .map(|model| {
                let family = model.family.family(seed);
                match &model.grid {
                    Some(axes) => Candidate { family, grid: axes.to_grid() },
                    None => Candidate::with_default_grid(family),
                }
            })
            .collect()
    }

    pub fn tune_options(&self) -> TuneOptions {
        TuneOptions { parallel: self.parallel }
    }
}
