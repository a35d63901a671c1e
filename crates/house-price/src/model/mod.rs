//! High-level model wrapper.
//!
//! [`HousePriceModel`] combines training, prediction, and serialization of a
//! random forest and the categorical encoders it was trained with.
//!
//! # Example
//!
//! ```ignore
//! use house_price::data::TrainingTable;
//! use house_price::model::{ForestConfig, HousePriceModel};
//!
//! let table = TrainingTable::from_csv_path("House Price Prediction Dataset.csv")?;
//! let model = HousePriceModel::train(&table, ForestConfig::default())?;
//!
//! model.save("house_model.pkl")?;
//! let loaded = HousePriceModel::load("house_model.pkl")?;
//! let price = loaded.predict(&house)?;
//! ```

mod config;
mod meta;
mod regressor;

pub use config::{ConfigError, ForestConfig, ForestConfigBuilder, MaxFeatures};
pub use meta::ModelMeta;
pub use regressor::{HousePriceModel, ModelError};
