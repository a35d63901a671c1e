//! Column schema for the house price dataset.
//!
//! The feature order defined here is the order the forest is trained on.
//! Every feature vector built at inference time must follow it exactly.

use std::fmt;

/// Name of the prediction target column.
pub const TARGET_COLUMN: &str = "Price";

/// Name of the optional row identifier column. Ignored when present.
pub const ID_COLUMN: &str = "Id";

/// Number of features fed to the model.
pub const N_FEATURES: usize = FeatureColumn::ALL.len();

// =============================================================================
// FeatureColumn
// =============================================================================

/// A model input column, in training order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureColumn {
    Area,
    Bedrooms,
    Bathrooms,
    Floors,
    YearBuilt,
    Location,
    Condition,
    Garage,
}

impl FeatureColumn {
    /// All feature columns in the order the model consumes them.
    pub const ALL: [FeatureColumn; 8] = [
        FeatureColumn::Area,
        FeatureColumn::Bedrooms,
        FeatureColumn::Bathrooms,
        FeatureColumn::Floors,
        FeatureColumn::YearBuilt,
        FeatureColumn::Location,
        FeatureColumn::Condition,
        FeatureColumn::Garage,
    ];

    /// Numeric columns, in training order.
    pub const NUMERIC: [FeatureColumn; 5] = [
        FeatureColumn::Area,
        FeatureColumn::Bedrooms,
        FeatureColumn::Bathrooms,
        FeatureColumn::Floors,
        FeatureColumn::YearBuilt,
    ];

    /// Header name in the CSV file.
    pub fn name(self) -> &'static str {
        match self {
            Self::Area => "Area",
            Self::Bedrooms => "Bedrooms",
            Self::Bathrooms => "Bathrooms",
            Self::Floors => "Floors",
            Self::YearBuilt => "YearBuilt",
            Self::Location => "Location",
            Self::Condition => "Condition",
            Self::Garage => "Garage",
        }
    }

    /// Position of this column in the feature vector.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the categorical column this feature maps to, if any.
    pub fn as_categorical(self) -> Option<CategoricalColumn> {
        match self {
            Self::Location => Some(CategoricalColumn::Location),
            Self::Condition => Some(CategoricalColumn::Condition),
            Self::Garage => Some(CategoricalColumn::Garage),
            _ => None,
        }
    }

    /// Returns true if values of this column are category labels.
    pub fn is_categorical(self) -> bool {
        self.as_categorical().is_some()
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Feature names in training order.
pub fn feature_names() -> Vec<String> {
    FeatureColumn::ALL.iter().map(|c| c.name().to_string()).collect()
}

// =============================================================================
// CategoricalColumn
// =============================================================================

/// A column holding category labels that must be encoded before training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoricalColumn {
    Location,
    Condition,
    Garage,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 3] = [
        CategoricalColumn::Location,
        CategoricalColumn::Condition,
        CategoricalColumn::Garage,
    ];

    pub fn name(self) -> &'static str {
        self.feature().name()
    }

    /// The feature slot this column occupies.
    pub fn feature(self) -> FeatureColumn {
        match self {
            Self::Location => FeatureColumn::Location,
            Self::Condition => FeatureColumn::Condition,
            Self::Garage => FeatureColumn::Garage,
        }
    }

    /// Look up a categorical column by its header name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for CategoricalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// HouseFeatures
// =============================================================================

/// One house described in raw (unencoded) form.
///
/// This is both a dataset row without its price and a prediction request.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseFeatures {
    pub area: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub floors: f64,
    pub year_built: f64,
    pub location: String,
    pub condition: String,
    pub garage: String,
}

impl HouseFeatures {
    /// Value of a numeric column. Returns `None` for categorical columns.
    pub fn numeric(&self, column: FeatureColumn) -> Option<f64> {
        match column {
            FeatureColumn::Area => Some(self.area),
            FeatureColumn::Bedrooms => Some(self.bedrooms),
            FeatureColumn::Bathrooms => Some(self.bathrooms),
            FeatureColumn::Floors => Some(self.floors),
            FeatureColumn::YearBuilt => Some(self.year_built),
            _ => None,
        }
    }

    /// Raw label of a categorical column.
    pub fn category(&self, column: CategoricalColumn) -> &str {
        match column {
            CategoricalColumn::Location => &self.location,
            CategoricalColumn::Condition => &self.condition,
            CategoricalColumn::Garage => &self.garage,
        }
    }
}
