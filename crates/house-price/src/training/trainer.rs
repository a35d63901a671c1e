//! Random forest trainer.
//!
//! Grows `n_trees` independent CART trees, each on its own bootstrap sample
//! with its own seeded RNG, and collects them in tree-index order.

use ndarray::{ArrayView1, ArrayView2};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::ForestConfig;
use crate::repr::Forest;
use crate::utils::Parallelism;

use super::grower::{GrowerParams, TreeGrower};
use super::sampling::{bootstrap_indices, tree_rng};

/// Errors raised when the training inputs cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    #[error("training data has no rows")]
    NoRows,

    #[error("training data has no features")]
    NoFeatures,

    #[error("feature matrix has {rows} rows but {targets} targets were given")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("non-finite value at row {row}, column {column}")]
    NonFiniteFeature { row: usize, column: usize },

    #[error("non-finite target at row {row}")]
    NonFiniteTarget { row: usize },
}

/// Random forest trainer.
#[derive(Debug, Clone)]
pub struct RandomForestTrainer {
    config: ForestConfig,
}

impl RandomForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Train a forest on a `[n_rows, n_features]` matrix.
    ///
    /// **Note:** This method does NOT create a thread pool. The caller sets up
    /// parallelism (see [`crate::utils::run_with_threads`]). The result does
    /// not depend on `parallelism`.
    pub fn train<'a>(
        &self,
        features: ArrayView2<'a, f64>,
        targets: ArrayView1<'a, f64>,
        parallelism: Parallelism,
    ) -> Result<Forest, TrainingError> {
        validate_inputs(features, targets)?;

        let (n_rows, n_features) = features.dim();
        let params = GrowerParams {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: self.config.max_features.resolve(n_features),
        };

        info!(
            n_trees = self.config.n_trees,
            n_rows,
            n_features,
            seed = self.config.seed,
            parallel = parallelism.is_parallel(),
            "training random forest"
        );

        let seed = self.config.seed;
        let bootstrap = self.config.bootstrap;
        let trees = parallelism.maybe_par_map(0..self.config.n_trees as usize, |tree_idx| {
            let mut rng = tree_rng(seed, tree_idx);
            let mut samples = if bootstrap {
                bootstrap_indices(n_rows, &mut rng)
            } else {
                (0..n_rows as u32).collect()
            };

            let mut grower = TreeGrower::new(features, targets, params.clone());
            let tree = grower.grow(&mut samples, &mut rng);
            debug!(
                tree = tree_idx,
                nodes = tree.n_nodes(),
                depth = tree.depth(),
                "grew tree"
            );
            tree
        });

        let forest = Forest::from_trees(trees, n_features);
        let total_leaves: usize = forest.trees().map(|t| t.n_leaves()).sum();
        info!(
            n_trees = forest.n_trees(),
            mean_leaves = total_leaves as f64 / forest.n_trees() as f64,
            "random forest trained"
        );
        Ok(forest)
    }
}

fn validate_inputs(features: ArrayView2<f64>, targets: ArrayView1<f64>) -> Result<(), TrainingError> {
    let (n_rows, n_features) = features.dim();
    if n_rows == 0 {
        return Err(TrainingError::NoRows);
    }
    if n_features == 0 {
        return Err(TrainingError::NoFeatures);
    }
    if targets.len() != n_rows {
        return Err(TrainingError::LengthMismatch {
            rows: n_rows,
            targets: targets.len(),
        });
    }
    if let Some(((row, column), _)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(TrainingError::NonFiniteFeature { row, column });
    }
    if let Some(row) = targets.iter().position(|v| !v.is_finite()) {
        return Err(TrainingError::NonFiniteTarget { row });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1, Array2};

    fn linear_data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| ((i * (j + 3)) % 17) as f64);
        let y = x.rows().into_iter().map(|r| 3.0 * r[0] - 2.0 * r[1] + 5.0).collect();
        (x, y)
    }

    fn config(n_trees: u32, seed: u64) -> ForestConfig {
        ForestConfig::builder().n_trees(n_trees).seed(seed).build().unwrap()
    }

    #[test]
    fn trains_requested_number_of_trees() {
        let (x, y) = linear_data(40);
        let forest = RandomForestTrainer::new(config(7, 1))
            .train(x.view(), y.view(), Parallelism::Sequential)
            .unwrap();
        assert_eq!(forest.n_trees(), 7);
        assert_eq!(forest.n_features(), 2);
        assert!(forest.validate().is_ok());
    }

    #[test]
    fn sequential_and_parallel_training_agree() {
        let (x, y) = linear_data(60);
        let trainer = RandomForestTrainer::new(config(12, 42));
        let seq = trainer.train(x.view(), y.view(), Parallelism::Sequential).unwrap();
        let par = trainer.train(x.view(), y.view(), Parallelism::Parallel).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn seed_changes_the_forest() {
        let (x, y) = linear_data(60);
        let a = RandomForestTrainer::new(config(5, 1))
            .train(x.view(), y.view(), Parallelism::Sequential)
            .unwrap();
        let b = RandomForestTrainer::new(config(5, 2))
            .train(x.view(), y.view(), Parallelism::Sequential)
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn without_bootstrap_every_tree_fits_training_rows() {
        let (x, y) = linear_data(30);
        let cfg = ForestConfig::builder()
            .n_trees(3)
            .bootstrap(false)
            .build()
            .unwrap();
        let forest = RandomForestTrainer::new(cfg)
            .train(x.view(), y.view(), Parallelism::Sequential)
            .unwrap();
        let pred = forest.predict(x.view(), Parallelism::Sequential);
        for (p, t) in pred.iter().zip(y.iter()) {
            assert_relative_eq!(*p, *t, max_relative = 1e-9);
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        let trainer = RandomForestTrainer::new(config(1, 0));

        let empty = Array2::<f64>::zeros((0, 2));
        let no_targets = Array1::<f64>::zeros(0);
        assert_eq!(
            trainer.train(empty.view(), no_targets.view(), Parallelism::Sequential),
            Err(TrainingError::NoRows)
        );

        let x = array![[1.0], [2.0]];
        let y = array![1.0];
        assert_eq!(
            trainer.train(x.view(), y.view(), Parallelism::Sequential),
            Err(TrainingError::LengthMismatch { rows: 2, targets: 1 })
        );

        let x = array![[1.0], [f64::NAN]];
        let y = array![1.0, 2.0];
        assert_eq!(
            trainer.train(x.view(), y.view(), Parallelism::Sequential),
            Err(TrainingError::NonFiniteFeature { row: 1, column: 0 })
        );
    }
}
