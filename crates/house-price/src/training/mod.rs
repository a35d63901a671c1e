//! Random forest training.
//!
//! - [`RandomForestTrainer`]: bootstrapped forest of CART trees
//! - [`TreeGrower`]: squared-error tree growth for a single tree
//! - [`sampling`]: per-tree RNGs, bootstrap and feature sampling

pub mod grower;
pub mod sampling;
pub mod trainer;

pub use grower::{GrowerParams, TreeGrower};
pub use trainer::{RandomForestTrainer, TrainingError};
