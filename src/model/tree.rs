//! CART regression trees
//!
//! Splits minimize the summed squared error of the two children. The same
//! grower backs [`DecisionTree`] and each member of the random forest; the
//! forest restricts the predictors tried at every node.

use ndarray::ArrayView1;

use super::{count_param, int_axis, Fitted, ModelFamily, ModelKind};
use crate::dataset::Design;
use crate::error::FitError;
use crate::grid::{Combination, HyperparamGrid};

const DEFAULT_MIN_N: usize = 2;
const DEFAULT_TREE_DEPTH: usize = 30;

/// Single regression tree; hyperparameters `min_n` and `tree_depth`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionTree;

impl ModelFamily for DecisionTree {
    fn kind(&self) -> ModelKind {
        ModelKind::Tree
    }

    fn hyperparameters(&self) -> &'static [&'static str] {
        &["min_n", "tree_depth"]
    }

    fn default_grid(&self) -> HyperparamGrid {
        HyperparamGrid::from_axes(&[
            int_axis("min_n", &[2, 10, 20]),
            int_axis("tree_depth", &[4, 8, 15]),
        ])
    }

    fn fit(
        &self,
        design: &Design,
        combination: &Combination,
    ) -> Result<Box<dyn Fitted>, FitError> {
        let params = TreeParams {
            min_n: count_param(combination, "min_n", DEFAULT_MIN_N)?,
            max_depth: count_param(combination, "tree_depth", DEFAULT_TREE_DEPTH)?,
        };
        let rows: Vec<usize> = (0..design.n_rows()).collect();
        let all = design.n_predictors();
        Ok(Box::new(TreeFit::grow(design, rows, &params, &mut |_| (0..all).collect())?))
    }
}

/// Stopping rules for tree growth.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    /// Nodes with fewer rows become leaves
    pub min_n: usize,
    /// Nodes at this depth become leaves; the root is depth 0
    pub max_depth: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Flattened tree; node 0 is the root.
#[derive(Debug, Clone)]
pub struct TreeFit {
    nodes: Vec<Node>,
}

impl TreeFit {
    /// Grow a tree over `rows` of `design` (rows may repeat, as in a
    /// bootstrap sample). `features` picks the candidate predictors at
    /// each node.
    pub(crate) fn grow(
        design: &Design,
        mut rows: Vec<usize>,
        params: &TreeParams,
        features: &mut dyn FnMut(usize) -> Vec<usize>,
    ) -> Result<Self, FitError> {
        if rows.is_empty() {
            return Err(FitError::new("cannot grow a tree on zero rows"));
        }
        let mut grower = Grower { design, params, features, nodes: Vec::new() };
        grower.build(&mut rows, 0);
        Ok(Self { nodes: grower.nodes })
    }

    /// Number of leaves.
    pub fn leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }
}

impl Fitted for TreeFit {
    fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    at = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

struct Grower<'a> {
    design: &'a Design,
    params: &'a TreeParams,
    features: &'a mut dyn FnMut(usize) -> Vec<usize>,
    nodes: Vec<Node>,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

impl Grower<'_> {
    fn build(&mut self, rows: &mut [usize], depth: usize) -> usize {
        let id = self.nodes.len();
        let (sum, sum_sq) = self.sums(rows);
        let n = rows.len() as f64;
        let mean = sum / n;
        self.nodes.push(Node::Leaf { value: mean });

        if rows.len() < self.params.min_n.max(2) || depth >= self.params.max_depth {
            return id;
        }
        let parent_sse = sum_sq - sum * sum / n;
        if parent_sse <= f64::EPSILON * sum_sq.abs().max(1.0) {
            return id;
        }

        let Some(best) = self.best_split(rows) else {
            return id;
        };
        if best.sse >= parent_sse {
            return id;
        }

        let x = &self.design.x;
        let mut split_at = 0;
        for i in 0..rows.len() {
            if x[[rows[i], best.feature]] <= best.threshold {
                rows.swap(i, split_at);
                split_at += 1;
            }
        }
        let (left_rows, right_rows) = rows.split_at_mut(split_at);
        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        self.nodes[id] =
            Node::Split { feature: best.feature, threshold: best.threshold, left, right };
        id
    }

    fn sums(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(s, sq), &r| {
            let y = self.design.y[r];
            (s + y, sq + y * y)
        })
    }

    fn best_split(&mut self, rows: &[usize]) -> Option<Candidate> {
        let design = self.design;
        let (x, y) = (&design.x, &design.y);
        let (total, total_sq) = self.sums(rows);
        let n = rows.len();
        let mut best: Option<Candidate> = None;

        for feature in (self.features)(x.ncols()) {
            let mut sorted = rows.to_vec();
            sorted.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let (mut left_sum, mut left_sq) = (0.0, 0.0);
            for i in 1..n {
                let prev = sorted[i - 1];
                left_sum += y[prev];
                left_sq += y[prev] * y[prev];

                let (lo, hi) = (x[[prev, feature]], x[[sorted[i], feature]]);
                if lo >= hi {
                    continue;
                }
                let (nl, nr) = (i as f64, (n - i) as f64);
                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let sse =
                    (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);
                if best.as_ref().map_or(true, |b| sse < b.sse) {
                    best = Some(Candidate { feature, threshold: threshold_between(lo, hi), sse });
                }
            }
        }
        best
    }
}

/// Midpoint of two distinct sorted values, kept strictly below `hi`.
///
/// For adjacent floats the midpoint rounds up to `hi`, which would send every
/// row left.
fn threshold_between(lo: f64, hi: f64) -> f64 {
    let mid = lo + (hi - lo) / 2.0;
    if mid < hi {
        mid
    } else {
        lo
    }
}
