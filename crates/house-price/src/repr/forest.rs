//! Averaging forest of regression trees.

use ndarray::{Array1, ArrayView2};

use crate::utils::Parallelism;

use super::tree::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestValidationError {
    /// The forest holds no trees, so it cannot predict.
    NoTrees,
    /// The forest was built for zero features.
    NoFeatures,
    InvalidTree {
        tree_idx: usize,
        error: TreeValidationError,
    },
}

impl std::fmt::Display for ForestValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTrees => write!(f, "forest has no trees"),
            Self::NoFeatures => write!(f, "forest has no features"),
            Self::InvalidTree { tree_idx, error } => write!(f, "tree {tree_idx}: {error}"),
        }
    }
}

impl std::error::Error for ForestValidationError {}

/// Random forest: prediction is the mean of the tree outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    n_features: usize,
}

impl Forest {
    /// Create an empty forest over `n_features` inputs.
    pub fn new(n_features: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_features,
        }
    }

    /// Create a forest from already built trees.
    pub fn from_trees(trees: Vec<Tree>, n_features: usize) -> Self {
        Self { trees, n_features }
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Validate every tree against this forest's feature count.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.trees.is_empty() {
            return Err(ForestValidationError::NoTrees);
        }
        if self.n_features == 0 {
            return Err(ForestValidationError::NoFeatures);
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| ForestValidationError::InvalidTree { tree_idx: i, error: e })?;
        }
        Ok(())
    }

    /// Predict a single row of `n_features` values.
    ///
    /// Trees are summed in a fixed order, so the result does not depend on
    /// how the caller parallelizes over rows.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.n_features);
        if self.trees.is_empty() {
            return f64::NAN;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(features)).sum();
        sum / self.trees.len() as f64
    }

    /// Predict a `[n_rows, n_features]` matrix.
    pub fn predict(&self, features: ArrayView2<f64>, parallelism: Parallelism) -> Array1<f64> {
        debug_assert_eq!(features.ncols(), self.n_features);
        let rows: Vec<Vec<f64>> = features.rows().into_iter().map(|r| r.to_vec()).collect();
        let predictions = parallelism.maybe_par_map(rows, |row| self.predict_row(&row));
        Array1::from_vec(predictions)
    }
}
