//! In-memory training table and CSV loading.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::schema::{FeatureColumn, HouseFeatures, TARGET_COLUMN};

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while loading a training dataset.
#[derive(Debug, Error)]
pub enum DataError {
    /// The dataset file does not exist.
    #[error("dataset not found: '{}'", path.display())]
    NotFound { path: PathBuf },

    /// A required column is absent from the header row.
    #[error("dataset is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    /// A numeric cell could not be parsed as a finite number.
    #[error("row {row}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// The file has a header but no data rows.
    #[error("dataset contains no rows")]
    Empty,

    /// Malformed CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error while opening the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Column layout
// =============================================================================

/// Positions of the required columns in a CSV header.
struct ColumnLayout {
    features: [usize; FeatureColumn::ALL.len()],
    target: usize,
}

impl ColumnLayout {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, DataError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(DataError::MissingColumn { column: name })
        };

        let mut features = [0usize; FeatureColumn::ALL.len()];
        for column in FeatureColumn::ALL {
            features[column.index()] = find(column.name())?;
        }
        let target = find(TARGET_COLUMN)?;

        Ok(Self { features, target })
    }

    fn cell<'r>(&self, record: &'r csv::StringRecord, column: FeatureColumn) -> &'r str {
        record.get(self.features[column.index()]).unwrap_or("")
    }
}

fn parse_number(value: &str, row: usize, column: &'static str) -> Result<f64, DataError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DataError::InvalidNumber {
            row,
            column,
            value: value.to_string(),
        }),
    }
}

// =============================================================================
// TrainingTable
// =============================================================================

/// Labeled house records ready for encoding.
///
/// Rows keep their categorical values as raw strings; encoding happens when
/// the model is trained so that the fitted encoders travel with the model.
#[derive(Debug, Clone, Default)]
pub struct TrainingTable {
    rows: Vec<HouseFeatures>,
    prices: Vec<f64>,
}

impl TrainingTable {
    /// Build a table from records and their prices.
    ///
    /// # Panics
    ///
    /// Panics if `rows` and `prices` differ in length.
    pub fn from_records(rows: Vec<HouseFeatures>, prices: Vec<f64>) -> Self {
        assert_eq!(rows.len(), prices.len(), "one price per row");
        Self { rows, prices }
    }

    /// Load a table from a CSV file with a header row.
    ///
    /// Columns are matched by header name. Extra columns such as `Id` are ignored.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DataError::NotFound {
                path: path.to_path_buf(),
            },
            _ => DataError::Io(e),
        })?;

        let table = Self::from_csv_reader(file)?;
        info!(
            path = %path.display(),
            rows = table.n_rows(),
            columns = FeatureColumn::ALL.len() + 1,
            "loaded training dataset"
        );
        Ok(table)
    }

    /// Load a table from any CSV source with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        debug!(headers = ?headers.iter().collect::<Vec<_>>(), "resolving CSV columns");
        let layout = ColumnLayout::resolve(&headers)?;

        let mut rows = Vec::new();
        let mut prices = Vec::new();

        for (i, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = i + 1;

            let numeric = |column: FeatureColumn| {
                parse_number(layout.cell(&record, column), row, column.name())
            };

            rows.push(HouseFeatures {
                area: numeric(FeatureColumn::Area)?,
                bedrooms: numeric(FeatureColumn::Bedrooms)?,
                bathrooms: numeric(FeatureColumn::Bathrooms)?,
                floors: numeric(FeatureColumn::Floors)?,
                year_built: numeric(FeatureColumn::YearBuilt)?,
                location: layout.cell(&record, FeatureColumn::Location).to_string(),
                condition: layout.cell(&record, FeatureColumn::Condition).to_string(),
                garage: layout.cell(&record, FeatureColumn::Garage).to_string(),
            });
            prices.push(parse_number(
                record.get(layout.target).unwrap_or(""),
                row,
                TARGET_COLUMN,
            )?);
        }

        if rows.is_empty() {
            return Err(DataError::Empty);
        }

        Ok(Self { rows, prices })
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw feature rows.
    pub fn rows(&self) -> &[HouseFeatures] {
        &self.rows
    }

    /// Target prices, one per row.
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Id,Area,Bedrooms,Bathrooms,Floors,YearBuilt,Location,Condition,Garage,Price
1,1360,5,4,3,1970,Downtown,Excellent,No,149919
2,4272,5,4,3,1958,Downtown,Excellent,No,424998
3,3592,2,2,3,1938,Downtown,Good,No,266746
";

    #[test]
    fn loads_rows_and_ignores_id() {
        let table = TrainingTable::from_csv_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.prices(), &[149919.0, 424998.0, 266746.0]);

        let first = &table.rows()[0];
        assert_eq!(first.area, 1360.0);
        assert_eq!(first.year_built, 1970.0);
        assert_eq!(first.location, "Downtown");
        assert_eq!(first.garage, "No");
    }

    #[test]
    fn column_order_does_not_matter() {
        let csv = "\
Price,Garage,Condition,Location,YearBuilt,Floors,Bathrooms,Bedrooms,Area
100,Yes,Fair,Rural,1990,2,1,3,1500
";
        let table = TrainingTable::from_csv_reader(csv.as_bytes()).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.area, 1500.0);
        assert_eq!(row.bedrooms, 3.0);
        assert_eq!(row.location, "Rural");
        assert_eq!(table.prices(), &[100.0]);
    }

    #[test]
    fn missing_target_is_reported() {
        let csv = "Area,Bedrooms,Bathrooms,Floors,YearBuilt,Location,Condition,Garage\n\
                   1000,2,1,1,1990,Urban,Good,Yes\n";
        let err = TrainingTable::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { column: "Price" }));
        assert!(err.to_string().contains("Price"));
    }

    #[test]
    fn missing_feature_is_reported() {
        let csv = "Area,Bedrooms,Bathrooms,Floors,YearBuilt,Condition,Garage,Price\n";
        let err = TrainingTable::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { column: "Location" }));
    }

    #[test]
    fn invalid_number_names_row_and_column() {
        let csv = "Area,Bedrooms,Bathrooms,Floors,YearBuilt,Location,Condition,Garage,Price\n\
                   1000,two,1,1,1990,Urban,Good,Yes,100\n";
        let err = TrainingTable::from_csv_reader(csv.as_bytes()).unwrap_err();
        match err {
            DataError::InvalidNumber { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "Bedrooms");
                assert_eq!(value, "two");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_is_empty() {
        let csv = "Area,Bedrooms,Bathrooms,Floors,YearBuilt,Location,Condition,Garage,Price\n";
        let err = TrainingTable::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Empty));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = TrainingTable::from_csv_path("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
        assert!(err.to_string().contains("here.csv"));
    }
}
