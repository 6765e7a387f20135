//! Document handles

use jewelviz_io::MediaType;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Opaque identifier of a document within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub(crate) u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

/// Which document set a document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    DesignReference,
    Mesh,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::DesignReference => f.write_str("design reference"),
            DocumentKind::Mesh => f.write_str("mesh"),
        }
    }
}

/// Raw file bytes plus what the viewer knows about them
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub name: String,
    pub media: MediaType,
    pub bytes: Arc<[u8]>,
}

impl DocumentHandle {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Geometry state of a document-set entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum GeometryStatus {
    /// Not parsed yet, or not a mesh
    Pending,
    Valid,
    /// Parsing or normalization failed
    Rejected(String),
}

impl GeometryStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, GeometryStatus::Valid)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, GeometryStatus::Rejected(_))
    }
}

/// Allocates session-unique document ids
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn next(&mut self) -> DocumentId {
        self.next += 1;
        DocumentId(self.next)
    }
}
