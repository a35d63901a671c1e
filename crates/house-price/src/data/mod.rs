//! Dataset schema and loading.
//!
//! - [`FeatureColumn`] / [`CategoricalColumn`]: the fixed column schema
//! - [`HouseFeatures`]: one house in raw form (also a prediction request)
//! - [`TrainingTable`]: labeled rows loaded from CSV

mod schema;
mod table;

pub use schema::{
    feature_names, CategoricalColumn, FeatureColumn, HouseFeatures, ID_COLUMN, N_FEATURES,
    TARGET_COLUMN,
};
pub use table::{DataError, TrainingTable};
