//! CART regression tree grower.
//!
//! Grows one tree depth-first on a (possibly bootstrapped) list of row
//! indices using the squared-error criterion. For every candidate feature the
//! node's samples are sorted by value and every boundary between two distinct
//! values is scored; the split with the largest impurity decrease wins.

use ndarray::{ArrayView1, ArrayView2};
use rand::Rng;

use crate::repr::{NodeId, Tree, TreeBuilder};

use super::sampling::sample_features;

/// Parameters controlling tree growth.
#[derive(Clone, Debug)]
pub struct GrowerParams {
    /// Maximum depth (root = depth 0). `None` = unlimited.
    pub max_depth: Option<u32>,
    /// Minimum samples a node needs to be split.
    pub min_samples_split: usize,
    /// Minimum samples in each child.
    pub min_samples_leaf: usize,
    /// Features considered at each split.
    pub max_features: usize,
}

/// Best split found for a node.
#[derive(Clone, Copy, Debug)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// `sum_left² / n_left + sum_right² / n_right`; larger is better.
    proxy: f64,
}

/// Work item: node id plus its sample range in the index buffer.
struct NodeTask {
    node: NodeId,
    start: usize,
    end: usize,
    depth: u32,
}

/// Grows regression trees over a fixed feature matrix.
pub struct TreeGrower<'a> {
    features: ArrayView2<'a, f64>,
    targets: ArrayView1<'a, f64>,
    params: GrowerParams,
    /// (value, target) pairs of the node being scanned.
    sorted: Vec<(f64, f64)>,
    candidate_features: Vec<usize>,
    partition_buf: Vec<u32>,
}

impl<'a> TreeGrower<'a> {
    pub fn new(features: ArrayView2<'a, f64>, targets: ArrayView1<'a, f64>, params: GrowerParams) -> Self {
        debug_assert_eq!(features.nrows(), targets.len());
        Self {
            features,
            targets,
            params,
            sorted: Vec::new(),
            candidate_features: Vec::new(),
            partition_buf: Vec::new(),
        }
    }

    /// Grow a tree on `samples` (row indices, repeats allowed).
    ///
    /// `samples` is reordered in place.
    pub fn grow<R: Rng + ?Sized>(&mut self, samples: &mut [u32], rng: &mut R) -> Tree {
        let mut builder = TreeBuilder::new();
        if samples.is_empty() {
            builder.push_leaf(0.0, 0);
            return builder.build();
        }

        let root_mean = self.mean(samples);
        let root = builder.push_leaf(root_mean, samples.len() as u32);
        let mut stack = vec![NodeTask {
            node: root,
            start: 0,
            end: samples.len(),
            depth: 0,
        }];

        while let Some(task) = stack.pop() {
            let node_samples = &mut samples[task.start..task.end];
            if !self.can_split(node_samples, task.depth) {
                continue;
            }

            let Some(split) = self.find_best_split(node_samples, rng) else {
                continue;
            };

            let n_left = self.partition(node_samples, split.feature, split.threshold);
            let (left_samples, right_samples) = node_samples.split_at(n_left);

            let left = builder.push_leaf(self.mean(left_samples), left_samples.len() as u32);
            let right = builder.push_leaf(self.mean(right_samples), right_samples.len() as u32);
            builder.make_split(task.node, split.feature as u32, split.threshold, left, right);

            let mid = task.start + n_left;
            stack.push(NodeTask {
                node: right,
                start: mid,
                end: task.end,
                depth: task.depth + 1,
            });
            stack.push(NodeTask {
                node: left,
                start: task.start,
                end: mid,
                depth: task.depth + 1,
            });
        }

        builder.build()
    }

    fn mean(&self, samples: &[u32]) -> f64 {
        let sum: f64 = samples.iter().map(|&i| self.targets[i as usize]).sum();
        sum / samples.len() as f64
    }

    /// Node-level stopping rules: size, depth, purity.
    fn can_split(&self, samples: &[u32], depth: u32) -> bool {
        if samples.len() < self.params.min_samples_split
            || samples.len() < 2 * self.params.min_samples_leaf
        {
            return false;
        }
        if self.params.max_depth.is_some_and(|d| depth >= d) {
            return false;
        }
        let first = self.targets[samples[0] as usize];
        samples.iter().any(|&i| self.targets[i as usize] != first)
    }

    fn find_best_split<R: Rng + ?Sized>(&mut self, samples: &[u32], rng: &mut R) -> Option<SplitCandidate> {
        let n_features = self.features.ncols();
        let mut candidates = std::mem::take(&mut self.candidate_features);
        sample_features(n_features, self.params.max_features, rng, &mut candidates);

        let mut best: Option<SplitCandidate> = None;
        for &feature in &candidates {
            if let Some(split) = self.best_split_for_feature(samples, feature) {
                if best.map_or(true, |b| split.proxy > b.proxy) {
                    best = Some(split);
                }
            }
        }

        self.candidate_features = candidates;
        best
    }

    fn best_split_for_feature(&mut self, samples: &[u32], feature: usize) -> Option<SplitCandidate> {
        let column = self.features.column(feature);
        self.sorted.clear();
        self.sorted.extend(samples.iter().map(|&i| {
            let i = i as usize;
            (column[i], self.targets[i])
        }));
        self.sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = self.sorted.len();
        let min_leaf = self.params.min_samples_leaf;
        let total: f64 = self.sorted.iter().map(|&(_, y)| y).sum();

        let mut best: Option<SplitCandidate> = None;
        let mut left_sum = 0.0;
        for i in 0..n - 1 {
            let (x, y) = self.sorted[i];
            left_sum += y;
            let n_left = i + 1;
            let n_right = n - n_left;

            let next_x = self.sorted[i + 1].0;
            if !(x < next_x) || n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let right_sum = total - left_sum;
            let proxy = left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
            if best.map_or(true, |b| proxy > b.proxy) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: split_threshold(x, next_x),
                    proxy,
                });
            }
        }
        best
    }

    /// Reorder `samples` so rows going left come first. Returns the left count.
    ///
    /// The partition is stable, which keeps growth deterministic.
    fn partition(&mut self, samples: &mut [u32], feature: usize, threshold: f64) -> usize {
        let column = self.features.column(feature);
        self.partition_buf.clear();
        let mut n_left = 0;
        for pos in 0..samples.len() {
            let i = samples[pos];
            if column[i as usize] < threshold {
                samples[n_left] = i;
                n_left += 1;
            } else {
                self.partition_buf.push(i);
            }
        }
        samples[n_left..].copy_from_slice(&self.partition_buf);
        n_left
    }
}

/// Midpoint between two adjacent distinct values, such that
/// `lower < threshold <= upper`.
fn split_threshold(lower: f64, upper: f64) -> f64 {
    let mid = lower + (upper - lower) / 2.0;
    if mid > lower && mid <= upper {
        mid
    } else {
        upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::sampling::tree_rng;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1, Array2};

    fn params() -> GrowerParams {
        GrowerParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }

    fn all_rows(n: usize) -> Vec<u32> {
        (0..n as u32).collect()
    }

    #[test]
    fn threshold_lies_between_values() {
        assert_eq!(split_threshold(1.0, 3.0), 2.0);
        let lower = 1.0f64;
        let upper = f64::from_bits(lower.to_bits() + 1);
        let t = split_threshold(lower, upper);
        assert!(lower < t && t <= upper);
    }

    #[test]
    fn fully_grown_tree_fits_training_data() {
        let x = array![[1.0, 0.0], [2.0, 1.0], [3.0, 0.0], [4.0, 1.0]];
        let y = array![10.0, 20.0, 30.0, 40.0];
        let mut grower = TreeGrower::new(x.view(), y.view(), params());
        let tree = grower.grow(&mut all_rows(4), &mut tree_rng(0, 0));

        for (row, &target) in x.rows().into_iter().zip(y.iter()) {
            assert_abs_diff_eq!(tree.predict_row(row.as_slice().unwrap()), target);
        }
        assert_eq!(tree.n_leaves(), 4);
        assert!(tree.validate(2).is_ok());
    }

    #[test]
    fn picks_the_informative_feature() {
        // Feature 1 separates the targets perfectly, feature 0 is noise.
        let x = array![[5.0, 0.0], [1.0, 0.0], [4.0, 1.0], [2.0, 1.0]];
        let y = array![1.0, 1.0, 9.0, 9.0];
        let mut grower = TreeGrower::new(x.view(), y.view(), params());
        let tree = grower.grow(&mut all_rows(4), &mut tree_rng(0, 0));

        assert_eq!(tree.split_index(0), 1);
        assert_abs_diff_eq!(tree.split_threshold(0), 0.5);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn pure_node_is_a_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![5.0, 5.0, 5.0];
        let mut grower = TreeGrower::new(x.view(), y.view(), params());
        let tree = grower.grow(&mut all_rows(3), &mut tree_rng(0, 0));
        assert_eq!(tree.n_nodes(), 1);
        assert_abs_diff_eq!(tree.leaf_value(0), 5.0);
    }

    #[test]
    fn constant_feature_cannot_split() {
        let x = array![[1.0], [1.0], [1.0]];
        let y = array![1.0, 2.0, 6.0];
        let mut grower = TreeGrower::new(x.view(), y.view(), params());
        let tree = grower.grow(&mut all_rows(3), &mut tree_rng(0, 0));
        assert_eq!(tree.n_nodes(), 1);
        assert_abs_diff_eq!(tree.leaf_value(0), 3.0);
    }

    #[test]
    fn max_depth_limits_growth() {
        let n = 64;
        let x = Array2::from_shape_fn((n, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(n, |i| (i * i) as f64);
        let mut grower = TreeGrower::new(
            x.view(),
            y.view(),
            GrowerParams {
                max_depth: Some(3),
                ..params()
            },
        );
        let tree = grower.grow(&mut all_rows(n), &mut tree_rng(0, 0));
        assert_eq!(tree.depth(), 3);
        assert!(tree.n_leaves() <= 8);
    }

    #[test]
    fn min_samples_leaf_is_respected() {
        let n = 20;
        let x = Array2::from_shape_fn((n, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(n, |i| if i == 0 { 100.0 } else { 0.0 });
        let mut grower = TreeGrower::new(
            x.view(),
            y.view(),
            GrowerParams {
                min_samples_leaf: 5,
                ..params()
            },
        );
        let tree = grower.grow(&mut all_rows(n), &mut tree_rng(0, 0));
        for node in 0..tree.n_nodes() as u32 {
            if tree.is_leaf(node) {
                assert!(tree.n_samples(node) >= 5);
            }
        }
    }

    #[test]
    fn repeated_rows_weight_the_leaf_mean() {
        // Rows 0 and 1 share x, so they always land in the same leaf.
        let x = array![[1.0], [1.0], [2.0]];
        let y = array![0.0, 3.0, 100.0];
        let mut grower = TreeGrower::new(x.view(), y.view(), params());
        let mut samples = vec![0, 1, 1, 2];
        let tree = grower.grow(&mut samples, &mut tree_rng(0, 0));
        assert_abs_diff_eq!(tree.predict_row(&[1.0]), 2.0);
        assert_abs_diff_eq!(tree.predict_row(&[2.0]), 100.0);
        assert_eq!(tree.n_samples(0), 4);
    }
}
