//! Conversion between [`HousePriceModel`] and its payload, plus file I/O.
//!
//! Most callers go through the methods on the model:
//!
//! ```ignore
//! model.save("house_model.pkl")?;
//! let model = HousePriceModel::load("house_model.pkl")?;
//! ```

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::data::{feature_names, CategoricalColumn, N_FEATURES};
use crate::encoding::{EncoderSet, LabelEncoder};
use crate::model::{HousePriceModel, ModelMeta};
use crate::repr::{Forest, Tree};

use super::native::{ArtifactCodec, DeserializeError, FormatHeader, SerializeError};
use super::payload::{EncoderPayload, ForestPayload, ModelMetadata, Payload, PayloadV1, TreePayload};

/// Errors raised while loading a model artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No artifact exists at the path.
    #[error("model file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid model file: {0}")]
    Deserialize(#[from] DeserializeError),
}

// ============================================================================
// Public API
// ============================================================================

/// Serialize model and encoders into one header-framed blob.
pub fn serialize_model(model: &HousePriceModel) -> Result<Vec<u8>, SerializeError> {
    let payload = Payload::from_model(model);
    let header = FormatHeader::new(
        N_FEATURES as u32,
        model.forest().n_trees() as u32,
        model.encoders().iter().count() as u32,
    );
    ArtifactCodec::new().serialize(header, &payload)
}

/// Deserialize and validate a blob produced by [`serialize_model`].
pub fn deserialize_model(bytes: &[u8]) -> Result<HousePriceModel, ArtifactError> {
    let (header, payload): (_, Payload) = ArtifactCodec::new().deserialize(bytes)?;
    debug!(
        version = %format!("{}.{}", header.version_major, header.version_minor),
        trees = header.num_trees,
        "decoded artifact header"
    );
    payload.check_header(&header)?;
    Ok(payload.into_model()?)
}

/// Write the artifact atomically: a sibling `.tmp` file is renamed over `path`.
pub fn write_artifact(model: &HousePriceModel, path: &Path) -> Result<(), SerializeError> {
    let bytes = serialize_model(model)?;
    replace_atomically(path, |file| Ok(file.write_all(&bytes)?))?;
    info!(path = %path.display(), bytes = bytes.len(), "saved model artifact");
    Ok(())
}

/// Read and validate the artifact at `path`.
pub fn read_artifact(path: &Path) -> Result<HousePriceModel, ArtifactError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArtifactError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ArtifactError::Io(e),
    })?;
    let model = deserialize_model(&bytes)?;
    info!(path = %path.display(), trees = model.forest().n_trees(), "loaded model artifact");
    Ok(model)
}

/// Fill a sibling `.tmp` file with `write` and rename it over `path`.
///
/// The `.tmp` file is removed on any failure, leaving `path` untouched.
fn replace_atomically<F>(path: &Path, write: F) -> Result<(), SerializeError>
where
    F: FnOnce(&mut File) -> Result<(), SerializeError>,
{
    let tmp = temp_path(path);
    let result = File::create(&tmp)
        .map_err(SerializeError::from)
        .and_then(|mut file| {
            write(&mut file)?;
            file.sync_all()?;
            Ok(())
        })
        .and_then(|()| fs::rename(&tmp, path).map_err(SerializeError::from));

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

// ============================================================================
// Payload Conversion
// ============================================================================

impl Payload {
    /// Reject payloads whose counts disagree with the header that framed them.
    fn check_header(&self, header: &FormatHeader) -> Result<(), DeserializeError> {
        let Payload::V1(v1) = self;
        let counts = [
            ("features", header.num_features, v1.metadata.num_features as usize),
            ("trees", header.num_trees, v1.forest.trees.len()),
            ("encoders", header.num_encoders, v1.encoders.len()),
        ];
        for (what, declared, actual) in counts {
            if declared as usize != actual {
                return Err(DeserializeError::CorruptPayload(format!(
                    "header declares {declared} {what}, payload has {actual}"
                )));
            }
        }
        Ok(())
    }

    /// Build a payload from a trained model.
    pub fn from_model(model: &HousePriceModel) -> Self {
        let meta = model.meta();
        let metadata = ModelMetadata {
            feature_names: meta.feature_names.clone(),
            num_features: meta.n_features as u32,
            num_training_rows: meta.n_training_rows as u64,
            seed: meta.seed,
        };

        let trees = model.forest().trees().map(TreePayload::from_tree).collect();

        let encoders = model
            .encoders()
            .iter()
            .map(|encoder| EncoderPayload {
                column: encoder.column().name().to_string(),
                classes: encoder.classes().to_vec(),
            })
            .collect();

        Payload::V1(PayloadV1 {
            metadata,
            forest: ForestPayload { trees },
            encoders,
        })
    }

    /// Rebuild the model, rejecting payloads that do not fit the house schema.
    pub fn into_model(self) -> Result<HousePriceModel, DeserializeError> {
        let Payload::V1(v1) = self;
        let PayloadV1 {
            metadata,
            forest,
            encoders,
        } = v1;

        let n_features = metadata.num_features as usize;
        if n_features != N_FEATURES || metadata.feature_names != feature_names() {
            return Err(DeserializeError::CorruptPayload(format!(
                "feature schema mismatch: {:?}",
                metadata.feature_names
            )));
        }

        let trees = forest
            .trees
            .into_iter()
            .enumerate()
            .map(|(idx, tree)| tree.into_tree(idx))
            .collect::<Result<Vec<_>, _>>()?;
        let forest = Forest::from_trees(trees, n_features);
        forest
            .validate()
            .map_err(|e| DeserializeError::CorruptPayload(e.to_string()))?;

        let encoders = encoders
            .into_iter()
            .map(EncoderPayload::into_encoder)
            .collect::<Result<Vec<_>, _>>()?;
        let encoders = EncoderSet::from_encoders(encoders)
            .map_err(|e| DeserializeError::CorruptPayload(e.to_string()))?;

        let meta = ModelMeta {
            feature_names: metadata.feature_names,
            n_features,
            n_training_rows: metadata.num_training_rows as usize,
            seed: metadata.seed,
        };

        Ok(HousePriceModel::from_parts(forest, encoders, meta))
    }
}

impl TreePayload {
    fn from_tree(tree: &Tree) -> Self {
        Self {
            num_nodes: tree.n_nodes() as u32,
            split_features: tree.split_indices().to_vec(),
            thresholds: tree.split_thresholds().to_vec(),
            left_children: tree.left_children().to_vec(),
            right_children: tree.right_children().to_vec(),
            is_leaf: tree.leaf_flags().to_vec(),
            leaf_values: tree.leaf_values().to_vec(),
            sample_counts: tree.sample_counts().to_vec(),
        }
    }

    fn into_tree(self, idx: usize) -> Result<Tree, DeserializeError> {
        let n = self.num_nodes as usize;
        let lengths = [
            self.split_features.len(),
            self.thresholds.len(),
            self.left_children.len(),
            self.right_children.len(),
            self.is_leaf.len(),
            self.leaf_values.len(),
            self.sample_counts.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(DeserializeError::CorruptPayload(format!(
                "tree {idx}: node arrays disagree with num_nodes={n}"
            )));
        }

        Ok(Tree::new(
            self.split_features,
            self.thresholds,
            self.left_children,
            self.right_children,
            self.is_leaf,
            self.leaf_values,
            self.sample_counts,
        ))
    }
}

impl EncoderPayload {
    fn into_encoder(self) -> Result<LabelEncoder, DeserializeError> {
        let column = CategoricalColumn::from_name(&self.column).ok_or_else(|| {
            DeserializeError::CorruptPayload(format!("unknown encoder column '{}'", self.column))
        })?;
        LabelEncoder::from_classes(column, self.classes).ok_or_else(|| {
            DeserializeError::CorruptPayload(format!("{column} classes are not sorted and unique"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForestConfig;
    use crate::testing::{reference_house, synthetic_table};

    fn small_model() -> HousePriceModel {
        let table = synthetic_table(80, 3);
        let config = ForestConfig::builder().n_trees(5).build().unwrap();
        HousePriceModel::train(&table, config).unwrap()
    }

    fn v1(payload: &mut Payload) -> &mut PayloadV1 {
        let Payload::V1(v1) = payload;
        v1
    }

    #[test]
    fn bytes_roundtrip_preserves_model() {
        let model = small_model();
        let bytes = serialize_model(&model).unwrap();
        let restored = deserialize_model(&bytes).unwrap();

        assert_eq!(restored, model);
        assert_eq!(
            restored.predict(&reference_house()).unwrap(),
            model.predict(&reference_house()).unwrap()
        );
    }

    #[test]
    fn header_counts_match_model() {
        let model = small_model();
        let bytes = serialize_model(&model).unwrap();
        let (header, _): (_, Payload) = ArtifactCodec::new().deserialize(&bytes).unwrap();

        assert_eq!(header.num_features as usize, N_FEATURES);
        assert_eq!(header.num_trees, 5);
        assert_eq!(header.num_encoders, 3);
    }

    #[test]
    fn missing_encoder_is_rejected() {
        let mut payload = Payload::from_model(&small_model());
        v1(&mut payload).encoders.retain(|e| e.column != "Garage");

        let err = payload.into_model().unwrap_err();
        assert!(matches!(err, DeserializeError::CorruptPayload(msg) if msg.contains("Garage")));
    }

    #[test]
    fn unsorted_classes_are_rejected() {
        let mut payload = Payload::from_model(&small_model());
        v1(&mut payload).encoders[0].classes.reverse();

        assert!(matches!(
            payload.into_model(),
            Err(DeserializeError::CorruptPayload(_))
        ));
    }

    #[test]
    fn schema_mismatch_is_rejected() {
        let mut payload = Payload::from_model(&small_model());
        v1(&mut payload).metadata.feature_names.swap(0, 1);

        assert!(matches!(
            payload.into_model(),
            Err(DeserializeError::CorruptPayload(_))
        ));
    }

    #[test]
    fn dangling_child_is_rejected() {
        let mut payload = Payload::from_model(&small_model());
        let tree = &mut v1(&mut payload).forest.trees[0];
        let root_is_split = !tree.is_leaf[0];
        if root_is_split {
            tree.left_children[0] = 10_000;
        } else {
            tree.num_nodes = 2;
        }

        assert!(matches!(
            payload.into_model(),
            Err(DeserializeError::CorruptPayload(_))
        ));
    }

    #[test]
    fn write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house_model.pkl");
        let model = small_model();

        write_artifact(&model, &path).unwrap();
        assert!(path.exists());
        assert!(!temp_path(&path).exists());

        let restored = read_artifact(&path).unwrap();
        assert_eq!(restored, model);
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house_model.pkl");

        let err = read_artifact(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound { path: p } if p == path));
    }

    #[test]
    fn read_foreign_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house_model.pkl");
        fs::write(&path, b"\x80\x04\x95this is a pickle, not a model artifact").unwrap();

        let err = read_artifact(&path).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::Deserialize(DeserializeError::NotAnArtifact)
        ));
    }

    #[test]
    fn header_count_mismatch_is_rejected() {
        let mut bytes = serialize_model(&small_model()).unwrap();
        // num_trees lives at offset 20; the checksum only covers the payload.
        bytes[20..24].copy_from_slice(&99u32.to_le_bytes());

        let err = deserialize_model(&bytes).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::Deserialize(DeserializeError::CorruptPayload(msg)) if msg.contains("trees")
        ));
    }

    #[test]
    fn failed_write_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house_model.pkl");
        fs::write(&path, b"previous artifact").unwrap();

        let result = replace_atomically(&path, |file| {
            file.write_all(b"partial")?;
            Err(std::io::Error::new(ErrorKind::WriteZero, "disk full").into())
        });

        assert!(matches!(result, Err(SerializeError::Io(_))));
        assert!(!temp_path(&path).exists());
        assert_eq!(fs::read(&path).unwrap(), b"previous artifact");
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let path = dir.path().join("house_model.pkl");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        let err = write_artifact(&small_model(), &path).unwrap_err();
        assert!(matches!(err, SerializeError::Io(_)));
        assert!(!temp_path(&path).exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn write_replaces_existing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house_model.pkl");
        fs::write(&path, b"stale").unwrap();

        let model = small_model();
        write_artifact(&model, &path).unwrap();
        assert_eq!(read_artifact(&path).unwrap(), model);
    }
}
