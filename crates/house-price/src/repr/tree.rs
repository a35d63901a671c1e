//! Structure-of-arrays regression tree.

use super::NodeId;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    EmptyTree,
    /// A child pointer references an out-of-bounds node.
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    /// A node references itself as a child.
    SelfLoop { node: NodeId },
    /// A node was reached by more than one path.
    DuplicateVisit { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    UnreachableNode { node: NodeId },
    /// A split references a feature the forest does not have.
    FeatureOutOfBounds { node: NodeId, feature: u32 },
    /// A split threshold or leaf value is NaN or infinite.
    NonFiniteValue { node: NodeId },
}

impl std::fmt::Display for TreeValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTree => write!(f, "tree has no nodes"),
            Self::ChildOutOfBounds {
                node,
                side,
                child,
                n_nodes,
            } => write!(
                f,
                "node {node}: {side} child {child} out of bounds ({n_nodes} nodes)"
            ),
            Self::SelfLoop { node } => write!(f, "node {node} references itself"),
            Self::DuplicateVisit { node } => write!(f, "node {node} reached more than once"),
            Self::UnreachableNode { node } => write!(f, "node {node} is unreachable"),
            Self::FeatureOutOfBounds { node, feature } => {
                write!(f, "node {node} splits on unknown feature {feature}")
            }
            Self::NonFiniteValue { node } => write!(f, "node {node} holds a non-finite value"),
        }
    }
}

impl std::error::Error for TreeValidationError {}

// ============================================================================
// Tree
// ============================================================================

/// Immutable binary regression tree stored as parallel arrays.
///
/// Child indices are local to this tree (0 = root). A sample goes left when
/// `value < threshold`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f64]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f64]>,
    /// Number of training samples (with bootstrap repeats) reaching each node.
    n_samples: Box<[u32]>,
}

impl Tree {
    /// Create a tree from parallel arrays.
    ///
    /// All arrays must have the same length (number of nodes). Split fields of
    /// leaves and leaf values of split nodes are ignored.
    pub fn new(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f64>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f64>,
        n_samples: Vec<u32>,
    ) -> Self {
        let n_nodes = split_indices.len();
        debug_assert_eq!(n_nodes, split_thresholds.len());
        debug_assert_eq!(n_nodes, left_children.len());
        debug_assert_eq!(n_nodes, right_children.len());
        debug_assert_eq!(n_nodes, is_leaf.len());
        debug_assert_eq!(n_nodes, leaf_values.len());
        debug_assert_eq!(n_nodes, n_samples.len());

        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
            n_samples: n_samples.into_boxed_slice(),
        }
    }

    /// A single-leaf tree.
    pub fn leaf(value: f64, n_samples: u32) -> Self {
        Self::new(
            vec![0],
            vec![0.0],
            vec![0],
            vec![0],
            vec![true],
            vec![value],
            vec![n_samples],
        )
    }

    // =========================================================================
    // Node access
    // =========================================================================

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.split_indices.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f64 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f64 {
        self.leaf_values[node as usize]
    }

    #[inline]
    pub fn n_samples(&self, node: NodeId) -> u32 {
        self.n_samples[node as usize]
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&l| l).count()
    }

    /// Length of the longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0 as NodeId, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((self.left_child(node), depth + 1));
                stack.push((self.right_child(node), depth + 1));
            }
        }
        max_depth
    }

    // =========================================================================
    // Raw arrays (for persistence)
    // =========================================================================

    pub fn split_indices(&self) -> &[u32] {
        &self.split_indices
    }

    pub fn split_thresholds(&self) -> &[f64] {
        &self.split_thresholds
    }

    pub fn left_children(&self) -> &[u32] {
        &self.left_children
    }

    pub fn right_children(&self) -> &[u32] {
        &self.right_children
    }

    pub fn leaf_flags(&self) -> &[bool] {
        &self.is_leaf
    }

    pub fn leaf_values(&self) -> &[f64] {
        &self.leaf_values
    }

    pub fn sample_counts(&self) -> &[u32] {
        &self.n_samples
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Walk from the root to the leaf reached by `features`.
    #[inline]
    pub fn traverse_to_leaf(&self, features: &[f64]) -> NodeId {
        let mut node = 0;
        while !self.is_leaf(node) {
            let value = features[self.split_index(node) as usize];
            node = if value < self.split_threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Predict a single row.
    #[inline]
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        self.leaf_value(self.traverse_to_leaf(features))
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate structural invariants for this tree.
    ///
    /// Run on every tree loaded from disk, so that traversal never indexes out
    /// of bounds or loops.
    pub fn validate(&self, n_features: usize) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];

        while let Some(node) = stack.pop() {
            let idx = node as usize;
            if visited[idx] {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            visited[idx] = true;

            if self.is_leaf(node) {
                if !self.leaf_value(node).is_finite() {
                    return Err(TreeValidationError::NonFiniteValue { node });
                }
                continue;
            }

            let feature = self.split_index(node);
            if feature as usize >= n_features {
                return Err(TreeValidationError::FeatureOutOfBounds { node, feature });
            }
            if !self.split_threshold(node).is_finite() {
                return Err(TreeValidationError::NonFiniteValue { node });
            }

            for (side, child) in [("left", self.left_child(node)), ("right", self.right_child(node))] {
                if child == node {
                    return Err(TreeValidationError::SelfLoop { node });
                }
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                stack.push(child);
            }
        }

        if let Some(node) = visited.iter().position(|&v| !v) {
            return Err(TreeValidationError::UnreachableNode { node: node as NodeId });
        }

        Ok(())
    }
}

// ============================================================================
// TreeBuilder
// ============================================================================

/// Incremental construction of a [`Tree`], used by the tree grower.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f64>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f64>,
    n_samples: Vec<u32>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a node. It starts as a leaf with the given value.
    pub fn push_leaf(&mut self, value: f64, n_samples: u32) -> NodeId {
        let id = self.split_indices.len() as NodeId;
        self.split_indices.push(0);
        self.split_thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.is_leaf.push(true);
        self.leaf_values.push(value);
        self.n_samples.push(n_samples);
        id
    }

    /// Turn a reserved node into a split with the given children.
    pub fn make_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f64,
        left: NodeId,
        right: NodeId,
    ) {
        let idx = node as usize;
        self.split_indices[idx] = feature;
        self.split_thresholds[idx] = threshold;
        self.left_children[idx] = left;
        self.right_children[idx] = right;
        self.is_leaf[idx] = false;
        self.leaf_values[idx] = 0.0;
    }

    pub fn n_nodes(&self) -> usize {
        self.split_indices.len()
    }

    pub fn build(self) -> Tree {
        Tree::new(
            self.split_indices,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.is_leaf,
            self.leaf_values,
            self.n_samples,
        )
    }
}
