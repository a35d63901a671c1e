//! Binary artifact format.
//!
//! The format consists of a 32-byte header followed by a Postcard-encoded
//! [`Payload`](super::Payload).
//!
//! # Format Structure
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Header (32 bytes)                       │
//! ├────────────────────────────────────────────────────────────┤
//! │                    Payload (variable)                      │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::io::{Read, Write};

use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Magic bytes identifying a house price model artifact.
pub const MAGIC: &[u8; 4] = b"HPRM";

/// Current format version (major).
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Current format version (minor).
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the format header in bytes.
pub const HEADER_SIZE: usize = 32;

// ============================================================================
// Format Header
// ============================================================================

/// 32-byte header of the artifact format.
///
/// # Layout
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     Magic ("HPRM")
/// 4       1     Version major
/// 5       1     Version minor
/// 6       2     Reserved
/// 8       4     Payload size (bytes)
/// 12      4     CRC32 checksum of payload
/// 16      4     Number of features
/// 20      4     Number of trees
/// 24      4     Number of encoders
/// 28      4     Reserved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub payload_size: u32,
    pub checksum: u32,
    pub num_features: u32,
    pub num_trees: u32,
    pub num_encoders: u32,
}

impl FormatHeader {
    /// Create a new header with current version.
    pub fn new(num_features: u32, num_trees: u32, num_encoders: u32) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            payload_size: 0,
            checksum: 0,
            num_features,
            num_trees,
            num_encoders,
        }
    }

    /// Serialize header to 32 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version_major;
        buf[5] = self.version_minor;
        buf[8..12].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        buf[16..20].copy_from_slice(&self.num_features.to_le_bytes());
        buf[20..24].copy_from_slice(&self.num_trees.to_le_bytes());
        buf[24..28].copy_from_slice(&self.num_encoders.to_le_bytes());
        buf
    }

    /// Parse header from 32 bytes.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, DeserializeError> {
        if &buf[0..4] != MAGIC {
            return Err(DeserializeError::NotAnArtifact);
        }

        let version_major = buf[4];
        let version_minor = buf[5];
        if version_major > CURRENT_VERSION_MAJOR {
            return Err(DeserializeError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }

        let word = |offset: usize| {
            u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
        };

        Ok(Self {
            version_major,
            version_minor,
            payload_size: word(8),
            checksum: word(12),
            num_features: word(16),
            num_trees: word(20),
            num_encoders: word(24),
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard encoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),

    /// Payload exceeds the 4 GiB limit of the header's size field.
    #[error("payload too large: {0} bytes")]
    TooLarge(usize),
}

/// Errors that can occur during deserialization.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// Wrong magic bytes.
    #[error("not a house price model artifact")]
    NotAnArtifact,

    /// Artifact was written by a newer format version.
    #[error("artifact format {major}.{minor} is newer than supported")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Payload checksum doesn't match.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// File was truncated or incomplete.
    #[error("artifact truncated: expected {expected} bytes")]
    Truncated { expected: usize },

    /// Payload decoded but is structurally invalid.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// I/O error during reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard decoding error.
    #[error("decoding error: {0}")]
    Decoding(#[from] postcard::Error),
}

/// Compute CRC32 checksum of data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// ============================================================================
// Artifact Codec
// ============================================================================

/// Codec for reading and writing the header-framed artifact format.
#[derive(Debug, Clone, Default)]
pub struct ArtifactCodec;

impl ArtifactCodec {
    pub fn new() -> Self {
        Self
    }

    /// Write header and payload to a writer.
    ///
    /// Fills in the header's payload size and checksum.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        header: &mut FormatHeader,
        payload: &[u8],
    ) -> Result<(), SerializeError> {
        header.payload_size =
            u32::try_from(payload.len()).map_err(|_| SerializeError::TooLarge(payload.len()))?;
        header.checksum = compute_checksum(payload);

        writer.write_all(&header.to_bytes())?;
        writer.write_all(payload)?;
        Ok(())
    }

    /// Read header and payload from a reader, verifying the checksum.
    pub fn read_from<R: Read>(&self, reader: &mut R) -> Result<(FormatHeader, Vec<u8>), DeserializeError> {
        let mut header_buf = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_buf).map_err(|e| truncated_or_io(e, HEADER_SIZE))?;

        let header = FormatHeader::from_bytes(&header_buf)?;

        // The declared size is untrusted; grow the buffer only as bytes arrive.
        let expected = header.payload_size as usize;
        let mut payload = Vec::new();
        reader
            .take(u64::from(header.payload_size))
            .read_to_end(&mut payload)
            .map_err(|e| truncated_or_io(e, expected))?;
        if payload.len() != expected {
            return Err(DeserializeError::Truncated { expected });
        }

        let actual = compute_checksum(&payload);
        if actual != header.checksum {
            return Err(DeserializeError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        Ok((header, payload))
    }

    /// Serialize a payload to bytes with header.
    pub fn serialize<T: serde::Serialize>(
        &self,
        mut header: FormatHeader,
        payload: &T,
    ) -> Result<Vec<u8>, SerializeError> {
        let payload_bytes = postcard::to_allocvec(payload)?;
        let mut output = Vec::with_capacity(HEADER_SIZE + payload_bytes.len());
        self.write_to(&mut output, &mut header, &payload_bytes)?;
        Ok(output)
    }

    /// Deserialize a payload from bytes.
    pub fn deserialize<T: for<'de> serde::Deserialize<'de>>(
        &self,
        bytes: &[u8],
    ) -> Result<(FormatHeader, T), DeserializeError> {
        let mut cursor = std::io::Cursor::new(bytes);
        let (header, payload_bytes) = self.read_from(&mut cursor)?;
        let payload = postcard::from_bytes(&payload_bytes)?;
        Ok((header, payload))
    }
}

fn truncated_or_io(e: std::io::Error, expected: usize) -> DeserializeError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        DeserializeError::Truncated { expected }
    } else {
        DeserializeError::Io(e)
    }
}

// ============================================================================
// Tests
// ============================================================================
