//! Categorical label encoding.
//!
//! A [`LabelEncoder`] maps the distinct labels seen at fit time to codes
//! `0..k-1`, ordered by sorted label. An [`EncoderSet`] holds one encoder per
//! categorical column and is persisted together with the forest, since tree
//! thresholds on categorical features only make sense for these exact codes.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::data::{CategoricalColumn, TrainingTable};

/// Errors raised when encoding or decoding category labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The label was not observed when the encoder was fitted.
    #[error("unknown {column} category '{value}'")]
    UnknownCategory {
        column: CategoricalColumn,
        value: String,
    },

    /// The code is outside `0..k`.
    #[error("{column} code {code} is out of range (encoder has {n_classes} classes)")]
    UnknownCode {
        column: CategoricalColumn,
        code: u32,
        n_classes: usize,
    },

    /// No encoder was fitted for this column.
    #[error("no encoder fitted for column {column}")]
    MissingEncoder { column: CategoricalColumn },
}

// =============================================================================
// LabelEncoder
// =============================================================================

/// Bijection between category labels and integer codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    column: CategoricalColumn,
    /// Sorted, deduplicated labels. A label's code is its index.
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit an encoder from observed labels.
    pub fn fit<I, S>(column: CategoricalColumn, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(|s| s.as_ref().to_string()).collect();
        classes.sort_unstable();
        classes.dedup();
        Self { column, classes }
    }

    /// Rebuild an encoder from a stored class list.
    ///
    /// Returns `None` if `classes` is not strictly sorted, which would break
    /// the code ordering the model was trained with.
    pub fn from_classes(column: CategoricalColumn, classes: Vec<String>) -> Option<Self> {
        if classes.windows(2).all(|w| w[0] < w[1]) {
            Some(Self { column, classes })
        } else {
            None
        }
    }

    /// The column this encoder was fitted on.
    pub fn column(&self) -> CategoricalColumn {
        self.column
    }

    /// Fitted labels, ordered by code.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Encode a label.
    pub fn transform(&self, label: &str) -> Result<u32, EncodeError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map(|idx| idx as u32)
            .map_err(|_| EncodeError::UnknownCategory {
                column: self.column,
                value: label.to_string(),
            })
    }

    /// Decode a code back to its label.
    pub fn inverse_transform(&self, code: u32) -> Result<&str, EncodeError> {
        self.classes
            .get(code as usize)
            .map(String::as_str)
            .ok_or(EncodeError::UnknownCode {
                column: self.column,
                code,
                n_classes: self.classes.len(),
            })
    }
}

// =============================================================================
// EncoderSet
// =============================================================================

/// One fitted [`LabelEncoder`] per categorical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSet {
    encoders: BTreeMap<CategoricalColumn, LabelEncoder>,
}

impl EncoderSet {
    /// Fit encoders for every categorical column of a table.
    pub fn fit(table: &TrainingTable) -> Self {
        let encoders = CategoricalColumn::ALL
            .into_iter()
            .map(|column| {
                let labels = table.rows().iter().map(|row| row.category(column));
                (column, LabelEncoder::fit(column, labels))
            })
            .collect();
        Self { encoders }
    }

    /// Assemble a set from already fitted encoders.
    ///
    /// Returns the first categorical column with no encoder, if any.
    pub fn from_encoders(
        encoders: impl IntoIterator<Item = LabelEncoder>,
    ) -> Result<Self, EncodeError> {
        let encoders: BTreeMap<_, _> = encoders.into_iter().map(|e| (e.column(), e)).collect();
        if let Some(column) = CategoricalColumn::ALL
            .into_iter()
            .find(|c| !encoders.contains_key(c))
        {
            return Err(EncodeError::MissingEncoder { column });
        }
        Ok(Self { encoders })
    }

    /// Encoder for a column.
    pub fn get(&self, column: CategoricalColumn) -> Result<&LabelEncoder, EncodeError> {
        self.encoders
            .get(&column)
            .ok_or(EncodeError::MissingEncoder { column })
    }

    /// Encode one label of a column.
    pub fn encode(&self, column: CategoricalColumn, label: &str) -> Result<u32, EncodeError> {
        self.get(column)?.transform(label)
    }

    /// Selectable labels of a column: exactly the classes seen at fit time.
    pub fn options(&self, column: CategoricalColumn) -> &[String] {
        self.encoders
            .get(&column)
            .map(LabelEncoder::classes)
            .unwrap_or(&[])
    }

    /// Iterate over encoders in column order.
    pub fn iter(&self) -> impl Iterator<Item = &LabelEncoder> {
        self.encoders.values()
    }
}
