//! Random train/test partition

use serde::{Deserialize, Serialize};

use super::shuffled_indices;
use crate::dataset::Dataset;
use crate::error::{EvalError, Result};

/// Default share of records assigned to training.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.75;

/// Disjoint training and testing subsets covering the source dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
    /// Source positions of the training records, in training order
    pub train_indices: Vec<usize>,
    /// Source positions of the testing records, in testing order
    pub test_indices: Vec<usize>,
}

/// Randomly partition `dataset` into training and testing subsets.
///
/// The training side receives `floor(n * train_fraction)` records.
///
/// # Errors
///
/// - [`EvalError::InvalidConfiguration`] unless `0 < train_fraction < 1`
/// - [`EvalError::InsufficientData`] if either side would be empty
pub fn split(dataset: &Dataset, train_fraction: f64, seed: u64) -> Result<Split> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(EvalError::invalid(format!(
            "train_fraction must be strictly between 0 and 1, got {train_fraction}"
        )));
    }

    let n = dataset.len();
    let n_train = (n as f64 * train_fraction).floor() as usize;
    if n_train == 0 || n_train == n {
        return Err(EvalError::insufficient(format!(
            "splitting {n} records at {train_fraction} leaves {n_train} for training \
             and {} for testing",
            n - n_train
        )));
    }

    let indices = shuffled_indices(n, seed);
    let (train_idx, test_idx) = indices.split_at(n_train);

    Ok(Split {
        train: dataset.subset(train_idx),
        test: dataset.subset(test_idx),
        train_indices: train_idx.to_vec(),
        test_indices: test_idx.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn numbered(n: usize) -> Dataset {
        Dataset::from_rows(&["y", "x"], (0..n).map(|i| vec![i as f64, 2.0 * i as f64]).collect())
            .unwrap()
    }

    #[test]
    fn test_hundred_records_three_quarters() {
        let s = split(&numbered(100), 0.75, 42).unwrap();
        assert_eq!(s.train.len(), 75);
        assert_eq!(s.test.len(), 25);
    }

    #[test]
    fn test_sides_are_disjoint_and_cover() {
        let s = split(&numbered(37), 0.6, 3).unwrap();
        let train: HashSet<_> = s.train_indices.iter().copied().collect();
        let test: HashSet<_> = s.test_indices.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 37);
        assert_eq!(s.train.len(), 22);
    }

    #[test]
    fn test_records_follow_indices() {
        let d = numbered(20);
        let s = split(&d, 0.5, 11).unwrap();
        for (pos, &src) in s.test_indices.iter().enumerate() {
            assert_eq!(s.test.records()[pos], d.records()[src]);
        }
    }

    #[test]
    fn test_same_seed_same_split() {
        let d = numbered(40);
        assert_eq!(split(&d, 0.75, 9).unwrap(), split(&d, 0.75, 9).unwrap());
    }

    #[test]
    fn test_fraction_out_of_range() {
        let d = numbered(10);
        for p in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(matches!(split(&d, p, 1), Err(EvalError::InvalidConfiguration(_))));
        }
    }

    #[test]
    fn test_empty_side_is_insufficient() {
        // floor(3 * 0.2) = 0 training records
        assert!(matches!(split(&numbered(3), 0.2, 1), Err(EvalError::InsufficientData(_))));
        assert!(matches!(split(&numbered(0), 0.5, 1), Err(EvalError::InsufficientData(_))));
    }
}
