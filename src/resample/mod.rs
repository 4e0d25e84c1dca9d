//! Train/test splitting and v-fold assignment
//!
//! Both steps shuffle with an explicitly seeded [`rand::rngs::StdRng`], so
//! the same dataset and seed always give the same partition.

mod folds;
mod split;

pub use folds::{make_folds, FoldAssignment};
pub use split::{split, Split, DEFAULT_TRAIN_FRACTION};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// `0..n` in a seed-determined order.
pub(crate) fn shuffled_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut idx = shuffled_indices(50, 7);
        idx.sort_unstable();
        assert_eq!(idx, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_depends_on_seed() {
        assert_eq!(shuffled_indices(30, 1), shuffled_indices(30, 1));
        assert_ne!(shuffled_indices(30, 1), shuffled_indices(30, 2));
    }
}
