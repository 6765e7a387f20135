//! Upload intake
//!
//! Screens user-selected files before they reach a document set. Mesh files
//! are accepted by extension alone; the parser validates their content later.
//! Design references must be a supported design media type. Every file must
//! fit the configured size limit.

use crate::{config::ViewerConfig, document::DocumentKind};
use jewelviz_io::{media, MediaType};
use std::{fmt, sync::Arc};

/// A file as handed over by the host
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    /// MIME type declared by the host, if any
    pub declared_type: Option<String>,
    pub bytes: Arc<[u8]>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, declared_type: Option<&str>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }
}

/// A file that passed screening
#[derive(Debug, Clone)]
pub struct AcceptedFile {
    pub name: String,
    pub media: MediaType,
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    TooLarge { size: u64, limit_mb: u64 },
    UnsupportedType(MediaType),
    WrongExtension { expected: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TooLarge { limit_mb, .. } => write!(f, "larger than {}MB", limit_mb),
            RejectReason::UnsupportedType(media) => write!(f, "unsupported type {}", media),
            RejectReason::WrongExtension { expected } => write!(f, "not a .{} file", expected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectReason,
}

/// Outcome of screening one batch of files
#[derive(Debug, Clone)]
pub struct IntakeReport {
    pub kind: DocumentKind,
    pub accepted: Vec<AcceptedFile>,
    pub rejected: Vec<Rejection>,
}

impl IntakeReport {
    /// One message listing every skipped file, if any were skipped
    pub fn warning(&self) -> Option<String> {
        if self.rejected.is_empty() {
            return None;
        }
        let skipped: Vec<String> = self
            .rejected
            .iter()
            .map(|r| format!("{} ({})", r.name, r.reason))
            .collect();
        Some(format!("Some files were skipped: {}", skipped.join(", ")))
    }
}

#[derive(Debug, Clone)]
pub struct UploadIntake {
    max_file_size_mb: u64,
    max_file_size_bytes: u64,
    mesh_extension: String,
}

impl UploadIntake {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            max_file_size_mb: config.max_file_size_mb,
            max_file_size_bytes: config.max_file_size_bytes(),
            mesh_extension: config.mesh_extension.trim_start_matches('.').to_ascii_lowercase(),
        }
    }

    /// Whether a file name carries the reserved mesh extension
    pub fn is_mesh_file_name(&self, name: &str) -> bool {
        media::has_extension(name, &self.mesh_extension)
    }

    /// Screen a batch of files destined for the `kind` document set
    pub fn screen(&self, kind: DocumentKind, files: Vec<IncomingFile>) -> IntakeReport {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for file in files {
            match self.check(kind, &file) {
                Ok(media) => accepted.push(AcceptedFile {
                    name: file.name,
                    media,
                    bytes: file.bytes,
                }),
                Err(reason) => rejected.push(Rejection {
                    name: file.name,
                    reason,
                }),
            }
        }

        tracing::debug!(
            %kind,
            accepted = accepted.len(),
            rejected = rejected.len(),
            "Screened upload batch"
        );
        IntakeReport {
            kind,
            accepted,
            rejected,
        }
    }

    fn check(&self, kind: DocumentKind, file: &IncomingFile) -> Result<MediaType, RejectReason> {
        let size = file.bytes.len() as u64;
        if size > self.max_file_size_bytes {
            return Err(RejectReason::TooLarge {
                size,
                limit_mb: self.max_file_size_mb,
            });
        }

        match kind {
            DocumentKind::Mesh => {
                if self.is_mesh_file_name(&file.name) {
                    Ok(MediaType::Stl)
                } else {
                    Err(RejectReason::WrongExtension {
                        expected: self.mesh_extension.clone(),
                    })
                }
            }
            DocumentKind::DesignReference => {
                let media = MediaType::detect(&file.name, file.declared_type.as_deref());
                if media.is_design_reference() {
                    Ok(media)
                } else {
                    Err(RejectReason::UnsupportedType(media))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake(limit_mb: u64) -> UploadIntake {
        UploadIntake::new(&ViewerConfig {
            max_file_size_mb: limit_mb,
            ..ViewerConfig::default()
        })
    }

    #[test]
    fn test_mesh_filter_by_extension_only() {
        let report = intake(50).screen(
            DocumentKind::Mesh,
            vec![
                IncomingFile::new("band.STL", None, vec![1u8, 2, 3]),
                IncomingFile::new("band.obj", Some("model/stl"), vec![1u8]),
                IncomingFile::new("garbage.stl", Some("text/plain"), b"hello".to_vec()),
            ],
        );
        let names: Vec<_> = report.accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["band.STL", "garbage.stl"]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::WrongExtension {
                expected: "stl".to_string()
            }
        );
    }

    #[test]
    fn test_design_filter_by_type() {
        let report = intake(50).screen(
            DocumentKind::DesignReference,
            vec![
                IncomingFile::new("sketch.png", Some("image/png"), vec![0u8; 8]),
                IncomingFile::new("specs.docx", None, vec![0u8; 8]),
                IncomingFile::new("notes.txt", Some("text/plain"), vec![0u8; 8]),
                IncomingFile::new("ring.stl", None, vec![0u8; 8]),
            ],
        );
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.rejected.len(), 2);
    }

    #[test]
    fn test_size_limit() {
        let limit = 1024 * 1024;
        let report = intake(1).screen(
            DocumentKind::Mesh,
            vec![
                IncomingFile::new("exact.stl", None, vec![0u8; limit]),
                IncomingFile::new("over.stl", None, vec![0u8; limit + 1]),
            ],
        );
        assert_eq!(report.accepted.len(), 1);
        assert!(matches!(report.rejected[0].reason, RejectReason::TooLarge { .. }));
    }

    #[test]
    fn test_batch_warning_lists_skipped_files() {
        let report = intake(50).screen(
            DocumentKind::DesignReference,
            vec![
                IncomingFile::new("a.txt", Some("text/plain"), vec![0u8]),
                IncomingFile::new("b.zip", None, vec![0u8]),
                IncomingFile::new("c.pdf", None, vec![0u8]),
            ],
        );
        let warning = report.warning().unwrap();
        assert!(warning.contains("a.txt"));
        assert!(warning.contains("b.zip"));
        assert!(!warning.contains("c.pdf"));

        let clean = intake(50).screen(DocumentKind::DesignReference, vec![]);
        assert!(clean.warning().is_none());
    }
}
