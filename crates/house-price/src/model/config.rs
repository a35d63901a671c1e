//! Random forest configuration with builder pattern.
//!
//! [`ForestConfig`] uses the `bon` crate for builder generation and validates
//! parameters when the builder finishes.
//!
//! # Example
//!
//! ```
//! use house_price::model::{ForestConfig, MaxFeatures};
//!
//! // All defaults: 100 trees, seed 42, fully grown trees
//! let config = ForestConfig::builder().build().unwrap();
//! assert_eq!(config.n_trees, 100);
//!
//! let config = ForestConfig::builder()
//!     .n_trees(20)
//!     .max_depth(8)
//!     .max_features(MaxFeatures::Sqrt)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Number of trees must be at least 1.
    InvalidNTrees,
    /// Maximum depth must be at least 1 when set.
    InvalidMaxDepth,
    /// A split needs at least two samples.
    InvalidMinSamplesSplit(usize),
    /// A leaf needs at least one sample.
    InvalidMinSamplesLeaf(usize),
    /// Feature fraction must be in (0, 1].
    InvalidMaxFeatures(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNTrees => write!(f, "n_trees must be at least 1"),
            Self::InvalidMaxDepth => write!(f, "max_depth must be at least 1"),
            Self::InvalidMinSamplesSplit(v) => {
                write!(f, "min_samples_split must be at least 2, got {}", v)
            }
            Self::InvalidMinSamplesLeaf(v) => {
                write!(f, "min_samples_leaf must be at least 1, got {}", v)
            }
            Self::InvalidMaxFeatures(v) => {
                write!(f, "max_features fraction must be in (0, 1], got {}", v)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// MaxFeatures
// =============================================================================

/// Number of features considered at each split.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MaxFeatures {
    /// Every feature at every split.
    #[default]
    All,
    /// `ceil(sqrt(n_features))` features.
    Sqrt,
    /// `ceil(fraction * n_features)` features, fraction in (0, 1].
    Fraction(f64),
}

impl MaxFeatures {
    /// Features to draw per split, clamped to `1..=n_features`.
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            Self::All => n_features,
            Self::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            Self::Fraction(f) => (f * n_features as f64).ceil() as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

// =============================================================================
// ForestConfig
// =============================================================================

/// Configuration for random forest training.
///
/// Defaults match a standard random forest regressor: 100 bootstrapped,
/// fully grown trees considering every feature at each split, seed 42.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ForestConfig {
    /// Number of trees. Default: 100.
    #[builder(default = 100)]
    pub n_trees: u32,

    /// Maximum tree depth. `None` grows until leaves are pure or too small.
    pub max_depth: Option<u32>,

    /// Minimum samples a node needs to be split. Default: 2.
    #[builder(default = 2)]
    pub min_samples_split: usize,

    /// Minimum samples in each child of a split. Default: 1.
    #[builder(default = 1)]
    pub min_samples_leaf: usize,

    /// Features considered per split. Default: all.
    #[builder(default)]
    pub max_features: MaxFeatures,

    /// Draw a bootstrap sample for each tree. Default: true.
    #[builder(default = true)]
    pub bootstrap: bool,

    /// Random seed. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    /// Thread count: 0 = auto, 1 = sequential, >1 = exact count.
    ///
    /// Does not affect the trained model.
    #[builder(default = 0)]
    pub n_threads: usize,
}

/// Custom finishing function that validates the config.
impl<S: forest_config_builder::IsComplete> ForestConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid.
    pub fn build(self) -> Result<ForestConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ForestConfig {
    /// Check parameter ranges. Needed when the struct is built without the builder.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }
        if self.max_depth == Some(0) {
            return Err(ConfigError::InvalidMaxDepth);
        }
        if self.min_samples_split < 2 {
            return Err(ConfigError::InvalidMinSamplesSplit(self.min_samples_split));
        }
        if self.min_samples_leaf < 1 {
            return Err(ConfigError::InvalidMinSamplesLeaf(self.min_samples_leaf));
        }
        if let MaxFeatures::Fraction(f) = self.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(ConfigError::InvalidMaxFeatures(f));
            }
        }
        Ok(())
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            seed: 42,
            n_threads: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_config_is_valid() {
        let config = ForestConfig::builder().build().unwrap();
        assert_eq!(config.n_trees, 100);
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_depth, None);
        assert!(config.bootstrap);
        assert_eq!(config.max_features, MaxFeatures::All);

        let default = ForestConfig::default();
        assert_eq!(default.n_trees, config.n_trees);
        assert_eq!(default.min_samples_split, config.min_samples_split);
    }

    #[test]
    fn invalid_n_trees_zero() {
        let result = ForestConfig::builder().n_trees(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidNTrees)));
    }

    #[test]
    fn invalid_max_depth_zero() {
        let result = ForestConfig::builder().max_depth(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidMaxDepth)));
    }

    #[test]
    fn invalid_min_samples() {
        let result = ForestConfig::builder().min_samples_split(1).build();
        assert!(matches!(result, Err(ConfigError::InvalidMinSamplesSplit(1))));

        let result = ForestConfig::builder().min_samples_leaf(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidMinSamplesLeaf(0))));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.5)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn invalid_feature_fraction(#[case] fraction: f64) {
        let result = ForestConfig::builder()
            .max_features(MaxFeatures::Fraction(fraction))
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidMaxFeatures(_))));
    }

    #[rstest]
    #[case(MaxFeatures::All, 8, 8)]
    #[case(MaxFeatures::Sqrt, 8, 3)]
    #[case(MaxFeatures::Sqrt, 1, 1)]
    #[case(MaxFeatures::Fraction(0.5), 8, 4)]
    #[case(MaxFeatures::Fraction(0.01), 8, 1)]
    fn max_features_resolve(#[case] mf: MaxFeatures, #[case] n: usize, #[case] expected: usize) {
        assert_eq!(mf.resolve(n), expected);
    }
}
