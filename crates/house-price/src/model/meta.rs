//! Model metadata.

use crate::data::{feature_names, N_FEATURES};

/// Introspection data stored alongside the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMeta {
    /// Feature names in training order.
    pub feature_names: Vec<String>,
    /// Number of features.
    pub n_features: usize,
    /// Number of rows the model was trained on.
    pub n_training_rows: usize,
    /// Seed used for training.
    pub seed: u64,
}

impl ModelMeta {
    /// Metadata for a model trained on the house schema.
    pub fn for_house_schema(n_training_rows: usize, seed: u64) -> Self {
        Self {
            feature_names: feature_names(),
            n_features: N_FEATURES,
            n_training_rows,
            seed,
        }
    }
}

impl Default for ModelMeta {
    fn default() -> Self {
        Self::for_house_schema(0, 0)
    }
}
