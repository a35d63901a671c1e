//! Model artifact storage.
//!
//! A trained [`HousePriceModel`](crate::model::HousePriceModel) is stored as
//! a single binary file holding the forest and the fitted label encoders
//! together. See [`native`] for the layout.

pub mod convert;
pub mod native;
pub mod payload;

/// Artifact location used by both the trainer and the web app.
pub const DEFAULT_ARTIFACT_PATH: &str = "house_model.pkl";

pub use convert::{deserialize_model, read_artifact, serialize_model, write_artifact, ArtifactError};
pub use native::{
    ArtifactCodec, DeserializeError, FormatHeader, SerializeError, CURRENT_VERSION_MAJOR,
    CURRENT_VERSION_MINOR, HEADER_SIZE, MAGIC,
};
pub use payload::{EncoderPayload, ForestPayload, ModelMetadata, Payload, PayloadV1, TreePayload};
