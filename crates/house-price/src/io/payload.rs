//! Payload structures for the artifact format.
//!
//! These structs are designed for serialization with Postcard. They mirror
//! the runtime types but stay independent of them, so the stored format can
//! evolve without touching the model code.

use serde::{Deserialize, Serialize};

// ============================================================================
// Top-Level Payload
// ============================================================================

/// Version-tagged payload enum for forward compatibility.
///
/// New format versions add new variants rather than modifying existing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Version 1 payload format.
    V1(PayloadV1),
}

/// Version 1 payload: the forest and its encoders, stored together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadV1 {
    pub metadata: ModelMetadata,
    pub forest: ForestPayload,
    pub encoders: Vec<EncoderPayload>,
}

// ============================================================================
// Metadata
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Feature names in training order.
    pub feature_names: Vec<String>,
    pub num_features: u32,
    pub num_training_rows: u64,
    pub seed: u64,
}

// ============================================================================
// Forest
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestPayload {
    pub trees: Vec<TreePayload>,
}

/// Single regression tree, one entry per node in every array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreePayload {
    pub num_nodes: u32,
    pub split_features: Vec<u32>,
    pub thresholds: Vec<f64>,
    pub left_children: Vec<u32>,
    pub right_children: Vec<u32>,
    pub is_leaf: Vec<bool>,
    pub leaf_values: Vec<f64>,
    pub sample_counts: Vec<u32>,
}

// ============================================================================
// Encoders
// ============================================================================

/// A fitted label encoder: the code of a label is its index in `classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderPayload {
    /// Column header name, e.g. `"Location"`.
    pub column: String,
    pub classes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes() {
        let payload = Payload::V1(PayloadV1 {
            metadata: ModelMetadata {
                feature_names: vec!["Area".into()],
                num_features: 1,
                num_training_rows: 3,
                seed: 42,
            },
            forest: ForestPayload {
                trees: vec![TreePayload {
                    num_nodes: 1,
                    split_features: vec![0],
                    thresholds: vec![0.0],
                    left_children: vec![0],
                    right_children: vec![0],
                    is_leaf: vec![true],
                    leaf_values: vec![123.5],
                    sample_counts: vec![3],
                }],
            },
            encoders: vec![EncoderPayload {
                column: "Garage".into(),
                classes: vec!["No".into(), "Yes".into()],
            }],
        });

        let bytes = postcard::to_allocvec(&payload).unwrap();
        assert!(!bytes.is_empty());

        let decoded: Payload = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, payload);
    }
}
