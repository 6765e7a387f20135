//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur while decoding documents
#[derive(Error, Debug)]
pub enum IoError {
    #[error("STL payload too short: {len} bytes, need at least 84 for header and triangle count")]
    HeaderTooShort { len: usize },

    #[error("STL payload truncated: {triangles} triangles need {expected} bytes, got {actual}")]
    Truncated {
        triangles: u32,
        expected: usize,
        actual: usize,
    },

    #[error("STL payload length mismatch: {triangles} triangles need {expected} bytes, got {actual}")]
    LengthMismatch {
        triangles: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Non-finite coordinate in triangle {triangle}")]
    NonFiniteCoordinate { triangle: usize },

    #[error("PDF page tree not found")]
    MissingPageTree,

    #[error("Unreadable image: {message}")]
    UnreadableImage { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for jewelviz_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => jewelviz_core::Error::Io(e),
            IoError::MissingPageTree | IoError::UnreadableImage { .. } => {
                jewelviz_core::Error::MetadataResolution(err.to_string())
            }
            other => jewelviz_core::Error::parse(other.to_string()),
        }
    }
}
