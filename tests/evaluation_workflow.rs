//! End-to-end evaluation workflow: CSV in, tuned and compared models out.

use std::io::Write;

use approx::assert_relative_eq;
use resampler::cli::run_command;
use resampler::config::{parse_args, EvalConfig};
use resampler::dataset::{Dataset, Formula};
use resampler::evaluate::{
    aggregate, compare_families, cross_validate, final_fit, select_best, show_best, tune_grid,
    Candidate, SummaryRow, TuneOptions,
};
use resampler::grid::{Combination, HyperparamGrid, ParameterValue};
use resampler::metric::{Direction, Metric};
use resampler::model::{ModelKind, NearestNeighbors};
use resampler::resample::{make_folds, split};
use resampler::EvalError;
use tempfile::NamedTempFile;

/// Synthetic monitor data: pm25 driven by cmaq and aod, with some gaps.
fn air_quality_csv(n: usize) -> String {
    let mut csv = String::from("pm25,cmaq,aod,poverty\n");
    for i in 0..n {
        let cmaq = 4.0 + (i % 23) as f64 * 0.5;
        let aod = 20.0 + ((i * 7) % 31) as f64;
        let poverty = ((i * 3) % 10) as f64 / 20.0;
        let noise = ((i * 13) % 7) as f64 * 0.1 - 0.3;
        let pm25 = 1.5 + 0.8 * cmaq + 0.05 * aod + noise;
        if i % 25 == 7 {
            csv.push_str(&format!("{pm25:.3},NA,{aod},{poverty}\n"));
        } else {
            csv.push_str(&format!("{pm25:.3},{cmaq},{aod},{poverty}\n"));
        }
    }
    csv
}

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn numbered(n: usize) -> Dataset {
    Dataset::from_rows(
        &["y", "x"],
        (0..n).map(|i| vec![(i % 9) as f64 + 0.5 * i as f64, i as f64]).collect(),
    )
    .unwrap()
}

#[test]
fn hundred_records_split_75_25() {
    let s = split(&numbered(100), 0.75, 42).unwrap();
    assert_eq!(s.train.len(), 75);
    assert_eq!(s.test.len(), 25);
}

#[test]
fn hundred_records_five_folds_of_twenty() {
    let folds = make_folds(&numbered(100), 5, 42).unwrap();
    assert_eq!(folds.v(), 5);
    assert!(folds.folds().iter().all(|f| f.len() == 20));
}

#[test]
fn three_neighbor_values_five_folds() {
    let train = numbered(100);
    let folds = make_folds(&train, 5, 42).unwrap();
    let grid = HyperparamGrid::new(
        [3, 5, 10]
            .into_iter()
            .map(|k| Combination::new().with("neighbors", ParameterValue::Int(k)))
            .collect(),
    );
    let formula: Formula = "y ~ x".parse().unwrap();

    let results = tune_grid(&train, &folds, &NearestNeighbors, &grid, &formula).unwrap();
    assert_eq!(results.len(), 15);

    let summary = aggregate(&results);
    assert_eq!(summary.for_metric(Metric::Rmse).count(), 3);
    assert!(summary.rows.iter().all(|r| r.n == 5 && r.n_failed == 0));

    let lowest = summary
        .for_metric(Metric::Rmse)
        .fold(None, |best: Option<&SummaryRow>, row| match best {
            Some(b) if b.mean <= row.mean => Some(b),
            _ => Some(row),
        })
        .unwrap();
    let best = select_best(&summary, Metric::Rmse, Direction::Minimize).unwrap();
    assert_eq!(best, lowest.combination);
    assert!(summary.for_metric(Metric::Rmse).all(|r| lowest.mean <= r.mean));
}

#[test]
fn single_fold_rejected_before_fitting() {
    let err = make_folds(&numbered(100), 1, 42).unwrap_err();
    assert!(matches!(err, EvalError::InvalidConfiguration(_)));
}

#[test]
fn cross_validate_reports_every_fold() {
    let train = numbered(60);
    let folds = make_folds(&train, 6, 1).unwrap();
    let formula: Formula = "y ~ x".parse().unwrap();
    let records = cross_validate(
        &train,
        &folds,
        &*ModelKind::Tree.family(0),
        &Combination::new(),
        &formula,
    )
    .unwrap();
    assert_eq!(records.len(), 6);
    assert!(records
        .iter()
        .all(|r| r.metric(Metric::Rmse).is_some() && r.metric(Metric::Rsq).is_some()));
}

#[test]
fn csv_to_final_fit() {
    let file = write_temp(&air_quality_csv(200));
    let formula: Formula = "pm25 ~ cmaq + aod".parse().unwrap();
    let data = Dataset::from_csv_path(file.path()).unwrap();
    assert_eq!(data.len(), 200);

    // rows with a missing cmaq cannot be used
    let data = data.complete_cases(&formula).unwrap();
    assert_eq!(data.len(), 192);

    let s = split(&data, 0.75, 42).unwrap();
    assert_eq!(s.train.len(), 144);
    let folds = make_folds(&s.train, 10, 42).unwrap();
    let linear = ModelKind::Linear.family(42);

    let grid = HyperparamGrid::single();
    let results = tune_grid(&s.train, &folds, &*linear, &grid, &formula).unwrap();
    let summary = aggregate(&results);
    let best = select_best(&summary, Metric::Rsq, Direction::Maximize).unwrap();
    assert!(best.is_empty());

    let top = show_best(&summary, Metric::Rmse, Direction::Minimize, 3);
    assert_eq!(top.len(), 1);
    assert!(top[0].mean < 0.5);

    let fit = final_fit(&s, &*linear, &best, &formula).unwrap();
    assert_eq!(fit.predictions.len(), 48);
    assert!(fit.metrics[&Metric::Rsq] > 0.95);
    assert_relative_eq!(
        fit.metrics[&Metric::Rmse],
        Metric::Rmse.compute(&fit.observed, &fit.predictions)
    );
}

#[test]
fn compare_ranks_every_family() {
    let data = Dataset::from_csv_reader(air_quality_csv(160).as_bytes()).unwrap();
    let formula: Formula = "pm25 ~ cmaq + aod".parse().unwrap();
    let data = data.complete_cases(&formula).unwrap();
    let s = split(&data, 0.75, 7).unwrap();
    let folds = make_folds(&s.train, 5, 7).unwrap();

    let candidates = vec![
        Candidate { family: ModelKind::Linear.family(7), grid: HyperparamGrid::single() },
        Candidate { family: ModelKind::Knn.family(7), grid: "neighbors=3,7".parse().unwrap() },
        Candidate { family: ModelKind::Tree.family(7), grid: "min_n=2,10".parse().unwrap() },
        Candidate {
            family: ModelKind::Forest.family(7),
            grid: "trees=20;mtry=1,2".parse().unwrap(),
        },
    ];
    let board =
        compare_families(&s, &folds, &candidates, &formula, Metric::Rmse, TuneOptions::default())
            .unwrap();

    assert_eq!(board.entries.len(), 4);
    assert_eq!(board.best().unwrap().kind, ModelKind::Linear);
    let scores: Vec<f64> = board.entries.iter().map(|e| e.test_score(Metric::Rmse)).collect();
    assert!(scores.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn config_file_drives_cli() {
    let data = write_temp(&air_quality_csv(120));
    let yaml = format!(
        "data:\n  path: {}\n  formula: \"pm25 ~ cmaq + aod\"\n\
         resampling:\n  folds: 4\n\
         models:\n  - family: knn\n    grid:\n      neighbors: [3, 5]\n",
        data.path().display()
    );
    let config_file = write_temp(&yaml);

    let config = EvalConfig::from_file(config_file.path()).unwrap();
    config.validate().unwrap();

    let cli = parse_args([
        "resampler",
        "evaluate",
        "--config",
        config_file.path().to_str().unwrap(),
        "--quiet",
        "--format",
        "json",
    ])
    .unwrap();
    run_command(cli).unwrap();
}

#[test]
fn evaluate_without_model_reports_none_configured() {
    let data = write_temp(&air_quality_csv(40));
    let cli = parse_args([
        "resampler",
        "evaluate",
        "--data",
        data.path().to_str().unwrap(),
        "--formula",
        "pm25 ~ cmaq",
        "--quiet",
    ])
    .unwrap();
    let err = run_command(cli).unwrap_err();
    assert_eq!(err.code(), "E003");
    assert!(err.to_string().contains("0 configured"), "{err}");
}

#[test]
fn cli_reports_bad_fold_count() {
    let data = write_temp(&air_quality_csv(40));
    let cli = parse_args([
        "resampler",
        "evaluate",
        "--data",
        data.path().to_str().unwrap(),
        "--formula",
        "pm25 ~ cmaq",
        "--model",
        "linear",
        "--folds",
        "1",
        "--quiet",
    ])
    .unwrap();
    let err = run_command(cli).unwrap_err();
    assert_eq!(err.code(), "E102");
}

#[test]
fn cli_compare_runs_selected_families() {
    let data = write_temp(&air_quality_csv(80));
    let cli = parse_args([
        "resampler",
        "compare",
        "--data",
        data.path().to_str().unwrap(),
        "--formula",
        "pm25 ~ cmaq + aod",
        "--models",
        "linear,tree",
        "--folds",
        "3",
        "--no-color",
        "--quiet",
    ])
    .unwrap();
    run_command(cli).unwrap();
}
