//! Prediction form fields and their validation.

use serde::Deserialize;
use thiserror::Error;

use crate::data::{CategoricalColumn, FeatureColumn, HouseFeatures};
use crate::model::HousePriceModel;

/// Allowed range and initial value of a numeric form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub column: FeatureColumn,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl FieldBounds {
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Numeric inputs in form order.
pub static NUMERIC_FIELDS: [FieldBounds; 5] = [
    FieldBounds { column: FeatureColumn::Area, min: 500.0, max: 10_000.0, default: 2000.0 },
    FieldBounds { column: FeatureColumn::Bedrooms, min: 1.0, max: 10.0, default: 3.0 },
    FieldBounds { column: FeatureColumn::Bathrooms, min: 1.0, max: 10.0, default: 2.0 },
    FieldBounds { column: FeatureColumn::Floors, min: 1.0, max: 5.0, default: 1.0 },
    FieldBounds { column: FeatureColumn::YearBuilt, min: 1900.0, max: 2024.0, default: 2000.0 },
];

/// Bounds of a numeric column. `None` for categorical columns.
pub fn bounds(column: FeatureColumn) -> Option<&'static FieldBounds> {
    NUMERIC_FIELDS.iter().find(|b| b.column == column)
}

/// A rejected form value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("{field}: '{value}' is not a number")]
    InvalidNumber { field: FeatureColumn, value: String },

    #[error("{field}: {value} must be a whole number")]
    NotWhole { field: FeatureColumn, value: f64 },

    #[error("{field}: {value} is outside {min}..={max}")]
    OutOfRange {
        field: FeatureColumn,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl FormError {
    pub fn field(&self) -> FeatureColumn {
        match self {
            Self::InvalidNumber { field, .. }
            | Self::NotWhole { field, .. }
            | Self::OutOfRange { field, .. } => *field,
        }
    }
}

/// Raw form submission, keyed by dataset column name.
///
/// Values stay as submitted text so the page can be re-rendered unchanged
/// when validation fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PredictionForm {
    pub area: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub floors: String,
    pub year_built: String,
    pub location: String,
    pub condition: String,
    pub garage: String,
}

impl PredictionForm {
    /// Initial form: numeric defaults and the first option of each select.
    pub fn initial(model: &HousePriceModel) -> Self {
        let first = |column| {
            model
                .options(column)
                .first()
                .cloned()
                .unwrap_or_default()
        };
        let mut form = Self {
            location: first(CategoricalColumn::Location),
            condition: first(CategoricalColumn::Condition),
            garage: first(CategoricalColumn::Garage),
            ..Self::default()
        };
        for field in NUMERIC_FIELDS {
            if let Some(slot) = form.numeric_mut(field.column) {
                *slot = field.default.to_string();
            }
        }
        form
    }

    /// Submitted text of a numeric field.
    pub fn numeric_text(&self, column: FeatureColumn) -> &str {
        match column {
            FeatureColumn::Area => &self.area,
            FeatureColumn::Bedrooms => &self.bedrooms,
            FeatureColumn::Bathrooms => &self.bathrooms,
            FeatureColumn::Floors => &self.floors,
            FeatureColumn::YearBuilt => &self.year_built,
            _ => "",
        }
    }

    /// Submitted label of a categorical field.
    pub fn category(&self, column: CategoricalColumn) -> &str {
        match column {
            CategoricalColumn::Location => &self.location,
            CategoricalColumn::Condition => &self.condition,
            CategoricalColumn::Garage => &self.garage,
        }
    }

    /// `None` for categorical columns, which have no free-text slot.
    fn numeric_mut(&mut self, column: FeatureColumn) -> Option<&mut String> {
        match column {
            FeatureColumn::Area => Some(&mut self.area),
            FeatureColumn::Bedrooms => Some(&mut self.bedrooms),
            FeatureColumn::Bathrooms => Some(&mut self.bathrooms),
            FeatureColumn::Floors => Some(&mut self.floors),
            FeatureColumn::YearBuilt => Some(&mut self.year_built),
            _ => None,
        }
    }

    /// Check numeric fields against their bounds.
    ///
    /// Categorical labels are passed through; the model rejects unseen ones.
    pub fn parse(&self) -> Result<HouseFeatures, FormError> {
        Ok(HouseFeatures {
            area: self.checked(FeatureColumn::Area)?,
            bedrooms: self.checked(FeatureColumn::Bedrooms)?,
            bathrooms: self.checked(FeatureColumn::Bathrooms)?,
            floors: self.checked(FeatureColumn::Floors)?,
            year_built: self.checked(FeatureColumn::YearBuilt)?,
            location: self.location.trim().to_string(),
            condition: self.condition.trim().to_string(),
            garage: self.garage.trim().to_string(),
        })
    }

    fn checked(&self, column: FeatureColumn) -> Result<f64, FormError> {
        let text = self.numeric_text(column);
        match bounds(column) {
            Some(bounds) => parse_numeric(bounds, text),
            None => Err(FormError::InvalidNumber {
                field: column,
                value: text.to_string(),
            }),
        }
    }
}

fn parse_numeric(bounds: &FieldBounds, text: &str) -> Result<f64, FormError> {
    let field = bounds.column;
    let value: f64 = text.trim().parse().map_err(|_| FormError::InvalidNumber {
        field,
        value: text.to_string(),
    })?;
    if !value.is_finite() {
        return Err(FormError::InvalidNumber {
            field,
            value: text.to_string(),
        });
    }
    if value.fract() != 0.0 {
        return Err(FormError::NotWhole { field, value });
    }
    if !bounds.contains(value) {
        return Err(FormError::OutOfRange {
            field,
            value,
            min: bounds.min,
            max: bounds.max,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::reference_house;
    use rstest::rstest;

    fn reference_form() -> PredictionForm {
        PredictionForm {
            area: "2000".into(),
            bedrooms: "3".into(),
            bathrooms: "2".into(),
            floors: "1".into(),
            year_built: "2000".into(),
            location: "Urban".into(),
            condition: "Good".into(),
            garage: "Yes".into(),
        }
    }

    #[test]
    fn defaults_are_within_bounds() {
        for field in NUMERIC_FIELDS {
            assert!(field.contains(field.default), "{}", field.column);
        }
        assert!(bounds(FeatureColumn::Location).is_none());
        assert_eq!(bounds(FeatureColumn::YearBuilt).unwrap().max, 2024.0);
    }

    #[test]
    fn parses_reference_form() {
        assert_eq!(reference_form().parse().unwrap(), reference_house());
    }

    #[rstest]
    #[case::area_low(FeatureColumn::Area, "499")]
    #[case::area_high(FeatureColumn::Area, "10001")]
    #[case::bedrooms_zero(FeatureColumn::Bedrooms, "0")]
    #[case::floors_high(FeatureColumn::Floors, "6")]
    #[case::year_future(FeatureColumn::YearBuilt, "2025")]
    fn out_of_range_is_rejected(#[case] column: FeatureColumn, #[case] text: &str) {
        let mut form = reference_form();
        *form.numeric_mut(column).unwrap() = text.into();

        let err = form.parse().unwrap_err();
        assert!(matches!(err, FormError::OutOfRange { .. }));
        assert_eq!(err.field(), column);
    }

    #[rstest]
    #[case("")]
    #[case("many")]
    #[case("NaN")]
    #[case("inf")]
    fn non_numbers_are_rejected(#[case] text: &str) {
        let mut form = reference_form();
        form.bathrooms = text.into();

        let err = form.parse().unwrap_err();
        assert!(matches!(err, FormError::InvalidNumber { field: FeatureColumn::Bathrooms, .. }));
    }

    #[test]
    fn categorical_columns_have_no_numeric_slot() {
        let mut form = reference_form();
        for column in [FeatureColumn::Location, FeatureColumn::Condition, FeatureColumn::Garage] {
            assert!(form.numeric_mut(column).is_none());
        }
        for field in NUMERIC_FIELDS {
            assert!(form.numeric_mut(field.column).is_some());
        }
        assert_eq!(form.area, "2000");
    }

    #[test]
    fn fractions_are_rejected() {
        let mut form = reference_form();
        form.bedrooms = "2.5".into();
        assert!(matches!(form.parse(), Err(FormError::NotWhole { .. })));
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut form = reference_form();
        form.area = "500".into();
        form.year_built = "2024".into();
        let house = form.parse().unwrap();
        assert_eq!(house.area, 500.0);
        assert_eq!(house.year_built, 2024.0);
    }
}
