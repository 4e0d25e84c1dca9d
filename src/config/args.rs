//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use resampler_common::CommonArgs;

use super::Overrides;
use crate::grid::GridAxes;
use crate::metric::Metric;
use crate::model::ModelKind;

/// Resampled model evaluation for tabular regression
#[derive(Parser, Debug)]
#[command(name = "resampler")]
#[command(version)]
#[command(
    about = "Cross-validate regression model families and tune their hyperparameters on a grid"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Tune one model family over a hyperparameter grid
    Evaluate(EvaluateArgs),

    /// Tune several families on shared folds and rank them on the test set
    Compare(CompareArgs),
}

/// Dataset and resampling arguments shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// CSV dataset with a header row
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Model formula, e.g. "pm25 ~ cmaq + aod"
    #[arg(short, long)]
    pub formula: Option<String>,

    /// YAML configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of cross-validation folds
    #[arg(long)]
    pub folds: Option<usize>,

    /// Random seed for the split, the folds, and forest sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Share of records used for training
    #[arg(long)]
    pub train_fraction: Option<f64>,

    /// Metric for picking the best combination (rmse, rsq, mae)
    #[arg(long)]
    pub metric: Option<Metric>,

    /// Evaluate grid units one at a time
    #[arg(long)]
    pub sequential: bool,
}

impl SourceArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            data: self.data.clone(),
            formula: self.formula.clone(),
            folds: self.folds,
            seed: self.seed,
            train_fraction: self.train_fraction,
            metric: self.metric,
            sequential: self.sequential,
            ..Default::default()
        }
    }
}

/// Arguments for the evaluate command
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Model family (linear, knn, tree, forest)
    #[arg(short, long)]
    pub model: Option<ModelKind>,

    /// Hyperparameter grid, e.g. "neighbors=3,5,10" or "min_n=2,5;tree_depth=4,8"
    #[arg(short, long)]
    pub grid: Option<GridAxes>,

    /// Number of top combinations to list
    #[arg(long, default_value = "5")]
    pub top: usize,
}

impl EvaluateArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            models: self.model.into_iter().collect(),
            grid: self.grid.clone(),
            ..self.source.overrides()
        }
    }
}

/// Arguments for the compare command
#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Families to compare; default is every family
    #[arg(long, value_delimiter = ',')]
    pub models: Vec<ModelKind>,
}

impl CompareArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides { models: self.models.clone(), ..self.source.overrides() }
    }
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluate() {
        let cli = parse_args([
            "resampler",
            "evaluate",
            "--data",
            "air.csv",
            "--formula",
            "pm25 ~ cmaq + aod",
            "--model",
            "knn",
            "--grid",
            "neighbors=3,5,10",
            "--folds",
            "5",
            "--sequential",
        ])
        .unwrap();

        match cli.command {
            Command::Evaluate(args) => {
                let o = args.overrides();
                assert_eq!(o.models, vec![ModelKind::Knn]);
                assert_eq!(o.folds, Some(5));
                assert!(o.sequential);
                assert_eq!(o.grid.unwrap().to_grid().len(), 3);
                assert_eq!(args.top, 5);
            }
            _ => panic!("Expected Evaluate command"),
        }
    }

    #[test]
    fn test_parse_compare_models_list() {
        let cli =
            parse_args(["resampler", "compare", "--models", "linear,forest", "--quiet"]).unwrap();
        assert!(cli.common.quiet);
        match cli.command {
            Command::Compare(args) => {
                assert_eq!(args.models, vec![ModelKind::Linear, ModelKind::Forest]);
            }
            _ => panic!("Expected Compare command"),
        }
    }

    #[test]
    fn test_rejects_unknown_model_and_metric() {
        assert!(parse_args(["resampler", "evaluate", "--model", "svm"]).is_err());
        assert!(parse_args(["resampler", "evaluate", "--metric", "auc"]).is_err());
        assert!(parse_args(["resampler", "evaluate", "--grid", "neighbors="]).is_err());
    }

    #[test]
    fn test_common_flags_are_global() {
        let cli = parse_args(["resampler", "evaluate", "--format", "json", "-v"]).unwrap();
        assert!(cli.common.verbose);
        assert_eq!(cli.common.format, resampler_common::OutputFormat::Json);
    }
}
