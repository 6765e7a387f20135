//! Error types for jewelviz

use thiserror::Error;

/// Main error type for jewelviz operations
///
/// The first five variants form the viewer taxonomy: each one is caught at the
/// viewport boundary and turned into an inline message, a fallback or a
/// placeholder. None of them is allowed to take down the enclosing layout.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed mesh bytes
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Mesh whose bounding box has zero extent (single point or empty)
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Material label missing from the catalog
    #[error("Unknown material preset: {0}")]
    UnknownPreset(String),

    /// Media type without an interactive viewer
    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    /// Page count or image metadata could not be discovered
    #[error("Metadata resolution failed: {0}")]
    MetadataResolution(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Failure reported by an external backend (persistence, storage, identity)
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a parse error from anything printable
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
        }
    }

    /// Whether this error should be shown to the user.
    ///
    /// Unknown presets are recovered silently and unsupported media degrades to
    /// a placeholder, so neither produces a banner.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Error::UnknownPreset(_) | Error::UnsupportedMedia(_))
    }
}

/// Result type alias for jewelviz operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_classification() {
        assert!(Error::parse("truncated").is_user_facing());
        assert!(Error::DegenerateGeometry("point".into()).is_user_facing());
        assert!(Error::MetadataResolution("no pages".into()).is_user_facing());
        assert!(!Error::UnknownPreset("Unobtainium".into()).is_user_facing());
        assert!(!Error::UnsupportedMedia("docx".into()).is_user_facing());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::parse("expected 134 bytes, got 100");
        assert_eq!(err.to_string(), "Parse error: expected 134 bytes, got 100");
    }
}
