//! V-fold assignment over a training set

use serde::{Deserialize, Serialize};

use super::shuffled_indices;
use crate::dataset::Dataset;
use crate::error::{EvalError, Result};

/// Partition of training positions into `v` disjoint folds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldAssignment {
    n_records: usize,
    folds: Vec<Vec<usize>>,
}

impl FoldAssignment {
    /// Build an assignment from explicit folds over `n_records` positions.
    ///
    /// Folds are not checked here; [`FoldAssignment::check_covers`] does
    /// that against a concrete training set.
    pub fn from_folds(n_records: usize, folds: Vec<Vec<usize>>) -> Self {
        Self { n_records, folds }
    }

    /// Number of folds.
    pub fn v(&self) -> usize {
        self.folds.len()
    }

    /// Size of the training set the folds partition.
    pub fn n_records(&self) -> usize {
        self.n_records
    }

    /// Held-out positions of each fold.
    pub fn folds(&self) -> &[Vec<usize>] {
        &self.folds
    }

    /// Held-out positions of fold `f`.
    pub fn holdout(&self, f: usize) -> &[usize] {
        &self.folds[f]
    }

    /// Training positions not in fold `f`, ascending.
    pub fn complement(&self, f: usize) -> Vec<usize> {
        let mut in_fold = vec![false; self.n_records];
        for &i in &self.folds[f] {
            if let Some(slot) = in_fold.get_mut(i) {
                *slot = true;
            }
        }
        (0..self.n_records).filter(|&i| !in_fold[i]).collect()
    }

    /// Verify the folds partition exactly `n` training positions.
    pub fn check_covers(&self, n: usize) -> Result<()> {
        if self.n_records != n {
            return Err(EvalError::insufficient(format!(
                "fold assignment was built for {} records but the training set has {n}",
                self.n_records
            )));
        }
        let mut seen = vec![false; n];
        for (f, fold) in self.folds.iter().enumerate() {
            for &i in fold {
                match seen.get_mut(i) {
                    Some(slot) if !*slot => *slot = true,
                    Some(_) => {
                        return Err(EvalError::insufficient(format!(
                            "record {i} appears in more than one fold (again in fold {f})"
                        )))
                    }
                    None => {
                        return Err(EvalError::insufficient(format!(
                            "fold {f} references record {i} outside a training set of {n}"
                        )))
                    }
                }
            }
        }
        if let Some(i) = seen.iter().position(|s| !s) {
            return Err(EvalError::insufficient(format!("record {i} is in no fold")));
        }
        Ok(())
    }
}

/// Assign every training record to one of `v` folds.
///
/// Positions are shuffled with `seed` and dealt into contiguous chunks; the
/// first `n % v` folds receive one extra record, so sizes differ by at most
/// one.
///
/// # Errors
///
/// [`EvalError::InvalidConfiguration`] unless `2 <= v <= train.len()`.
pub fn make_folds(train: &Dataset, v: usize, seed: u64) -> Result<FoldAssignment> {
    let n = train.len();
    if v < 2 || v > n {
        return Err(EvalError::invalid(format!(
            "fold count v must satisfy 2 <= v <= {n} (training records), got {v}"
        )));
    }

    let indices = shuffled_indices(n, seed);
    let fold_size = n / v;
    let remainder = n % v;

    let mut folds = Vec::with_capacity(v);
    let mut start = 0;
    for i in 0..v {
        let end = start + fold_size + usize::from(i < remainder);
        let mut fold = indices[start..end].to_vec();
        fold.sort_unstable();
        folds.push(fold);
        start = end;
    }

    Ok(FoldAssignment { n_records: n, folds })
}
