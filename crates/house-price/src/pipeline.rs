//! End-to-end training run: dataset in, artifact out.

use std::path::PathBuf;
use std::time::Instant;

use thiserror::Error;
use tracing::info;

use crate::data::{DataError, TrainingTable};
use crate::io::{SerializeError, DEFAULT_ARTIFACT_PATH};
use crate::model::{ConfigError, ForestConfig, HousePriceModel, ModelError};

/// Dataset read by the trainer.
pub const DEFAULT_DATASET_PATH: &str = "House Price Prediction Dataset.csv";

/// Input and output locations of a training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerPaths {
    pub dataset: PathBuf,
    pub artifact: PathBuf,
}

impl Default for TrainerPaths {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DEFAULT_DATASET_PATH),
            artifact: PathBuf::from(DEFAULT_ARTIFACT_PATH),
        }
    }
}

/// Errors of a training run. No artifact is written when any of these occurs.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("invalid forest configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("training failed: {0}")]
    Model(#[from] ModelError),

    #[error("failed to save model: {0}")]
    Save(#[from] SerializeError),
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSummary {
    pub artifact: PathBuf,
    pub n_rows: usize,
    pub n_trees: usize,
}

/// Load the dataset, fit encoders and forest, and save the artifact.
pub fn train_artifact(paths: &TrainerPaths, config: ForestConfig) -> Result<TrainSummary, TrainError> {
    config.validate()?;

    let table = TrainingTable::from_csv_path(&paths.dataset)?;

    let start = Instant::now();
    let model = HousePriceModel::train(&table, config)?;
    info!(
        trees = model.forest().n_trees(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "trained random forest"
    );

    model.save(&paths.artifact)?;

    Ok(TrainSummary {
        artifact: paths.artifact.clone(),
        n_rows: table.n_rows(),
        n_trees: model.forest().n_trees(),
    })
}
