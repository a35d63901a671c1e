//! House price model: forest and encoders as one value.
//!
//! The forest's split thresholds on Location, Condition and Garage refer to
//! the integer codes produced by the fitted encoders. The two are therefore
//! trained, stored, loaded and used together, never separately.

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView2};
use thiserror::Error;
use tracing::debug;

use crate::data::{CategoricalColumn, FeatureColumn, HouseFeatures, TrainingTable, N_FEATURES};
use crate::encoding::{EncodeError, EncoderSet};
use crate::io::{ArtifactError, SerializeError};
use crate::repr::Forest;
use crate::training::{RandomForestTrainer, TrainingError};
use crate::utils::{run_with_threads, Parallelism};

use super::{ForestConfig, ModelMeta};

/// Errors raised while training a [`HousePriceModel`].
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Training(#[from] TrainingError),
}

/// Trained house price regressor.
///
/// Access components via [`forest()`](Self::forest),
/// [`encoders()`](Self::encoders) and [`meta()`](Self::meta).
#[derive(Debug, Clone, PartialEq)]
pub struct HousePriceModel {
    forest: Forest,
    encoders: EncoderSet,
    meta: ModelMeta,
}

impl HousePriceModel {
    /// Create a model from its parts.
    ///
    /// Used when loading from disk. The caller is responsible for passing the
    /// encoders the forest was trained with.
    pub fn from_parts(forest: Forest, encoders: EncoderSet, meta: ModelMeta) -> Self {
        Self {
            forest,
            encoders,
            meta,
        }
    }

    /// Fit encoders on `table`, encode it, and train a random forest.
    pub fn train(table: &TrainingTable, config: ForestConfig) -> Result<Self, ModelError> {
        let encoders = EncoderSet::fit(table);
        for encoder in encoders.iter() {
            debug!(column = %encoder.column(), classes = ?encoder.classes(), "fitted encoder");
        }

        let features = encode_table(&encoders, table)?;
        let targets = Array1::from_vec(table.prices().to_vec());

        let meta = ModelMeta::for_house_schema(table.n_rows(), config.seed);
        let n_threads = config.n_threads;
        let trainer = RandomForestTrainer::new(config);
        let forest = run_with_threads(n_threads, |parallelism| {
            trainer.train(features.view(), targets.view(), parallelism)
        })?;

        Ok(Self {
            forest,
            encoders,
            meta,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// Selectable labels for a categorical field: exactly the fitted classes.
    pub fn options(&self, column: CategoricalColumn) -> &[String] {
        self.encoders.options(column)
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Build the feature vector for one house, in training column order.
    pub fn encode(&self, house: &HouseFeatures) -> Result<[f64; N_FEATURES], EncodeError> {
        encode_features(&self.encoders, house)
    }

    /// Predict the price of one house.
    ///
    /// Fails with [`EncodeError::UnknownCategory`] if a categorical value was
    /// not seen during training.
    pub fn predict(&self, house: &HouseFeatures) -> Result<f64, EncodeError> {
        let row = self.encode(house)?;
        let price = self.forest.predict_row(&row);
        debug!(features = ?row, price, "predicted price");
        Ok(price)
    }

    /// Predict already encoded rows (`[n_rows, N_FEATURES]`).
    pub fn predict_batch(&self, features: ArrayView2<f64>) -> Array1<f64> {
        self.forest.predict(features, Parallelism::Sequential)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Serialize model and encoders into one artifact blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        crate::io::serialize_model(self)
    }

    /// Deserialize an artifact blob produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        crate::io::deserialize_model(bytes)
    }

    /// Write the artifact to `path`, replacing any existing file.
    ///
    /// The blob is written to a sibling temporary file first and renamed into
    /// place, so a failed save never leaves a truncated artifact behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SerializeError> {
        crate::io::write_artifact(self, path.as_ref())
    }

    /// Read an artifact from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        crate::io::read_artifact(path.as_ref())
    }
}

/// Encode one house. Shared by training and inference so both use the same
/// column order and the same codes.
fn encode_features(
    encoders: &EncoderSet,
    house: &HouseFeatures,
) -> Result<[f64; N_FEATURES], EncodeError> {
    let mut row = [0.0; N_FEATURES];
    for column in FeatureColumn::ALL {
        row[column.index()] = match column.as_categorical() {
            Some(cat) => f64::from(encoders.encode(cat, house.category(cat))?),
            None => house.numeric(column).unwrap_or(f64::NAN),
        };
    }
    Ok(row)
}

fn encode_table(encoders: &EncoderSet, table: &TrainingTable) -> Result<Array2<f64>, EncodeError> {
    let mut features = Array2::zeros((table.n_rows(), N_FEATURES));
    for (mut out, house) in features.rows_mut().into_iter().zip(table.rows()) {
        let row = encode_features(encoders, house)?;
        out.assign(&ndarray::ArrayView1::from(&row[..]));
    }
    Ok(features)
}
