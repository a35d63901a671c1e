//! house-price: random forest house price regression.
//!
//! Trains a random forest on a labeled CSV of houses, stores it together with
//! the categorical encoders as one artifact, and serves predictions through a
//! single-page HTML form.
//!
//! # Key Types
//!
//! - [`HousePriceModel`] - Forest plus encoders, with train/predict/save/load
//! - [`ForestConfig`] - Configuration builder
//! - [`TrainingTable`] / [`HouseFeatures`] - Data handling
//! - [`EncoderSet`] / [`LabelEncoder`] - Categorical label encoding
//!
//! # Training
//!
//! [`pipeline::train_artifact`] runs the whole job: load the CSV, fit, save.
//! The `train` binary calls it with the fixed default paths.
//!
//! # Serving
//!
//! With the `serve` feature, [`serving::router`] builds the axum app used by
//! the `serve` binary.

pub mod data;
pub mod encoding;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod repr;
#[cfg(feature = "serve")]
pub mod serving;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use model::{ForestConfig, HousePriceModel, MaxFeatures, ModelMeta};

pub use data::{CategoricalColumn, DataError, FeatureColumn, HouseFeatures, TrainingTable};
pub use encoding::{EncodeError, EncoderSet, LabelEncoder};
pub use io::{ArtifactError, DEFAULT_ARTIFACT_PATH};
pub use pipeline::{train_artifact, TrainError, TrainSummary, TrainerPaths, DEFAULT_DATASET_PATH};

pub use utils::{run_with_threads, Parallelism};
