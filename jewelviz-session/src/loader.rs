//! Asynchronous document loads guarded by generation tickets
//!
//! A load captures the document it was started for together with the owning
//! set's generation. When the outcome arrives the session compares the ticket
//! with the current selection and discards anything stale, so the last
//! selection always wins.

use crate::document::{DocumentId, DocumentKind};
use jewelviz_core::{normalize, NormalizedGeometry, Result};
use jewelviz_io::{pdf, raster, MediaType, PreviewClass, RasterInfo, StlReader};
use std::sync::Arc;

/// Identity of one in-flight load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub kind: DocumentKind,
    pub document: DocumentId,
    pub generation: u64,
}

/// A parsed mesh normalized into both canonical frames
#[derive(Debug, Clone)]
pub struct LoadedMesh {
    pub preview: NormalizedGeometry,
    pub showcase: NormalizedGeometry,
}

impl LoadedMesh {
    pub fn triangle_count(&self) -> usize {
        self.preview.mesh().face_count()
    }
}

/// Parse and normalize mesh bytes
pub fn load_mesh(bytes: &[u8], preview_size: f32, showcase_size: f32) -> Result<LoadedMesh> {
    let mesh = StlReader::parse(bytes)?;
    let preview = normalize(&mesh, preview_size)?;
    let showcase = normalize(&mesh, showcase_size)?;
    Ok(LoadedMesh { preview, showcase })
}

#[derive(Debug, Clone)]
pub struct MeshLoadRequest {
    pub ticket: LoadTicket,
    pub(crate) bytes: Arc<[u8]>,
    pub(crate) preview_size: f32,
    pub(crate) showcase_size: f32,
}

#[derive(Debug)]
pub struct MeshLoadOutcome {
    pub ticket: LoadTicket,
    pub result: Result<LoadedMesh>,
}

impl MeshLoadRequest {
    /// Parse and normalize the mesh
    pub async fn run(self) -> MeshLoadOutcome {
        let result = load_mesh(&self.bytes, self.preview_size, self.showcase_size);
        MeshLoadOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Metadata discovered for a design document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentMetadata {
    Pages(u32),
    Raster(RasterInfo),
    /// Discovery failed; views degrade gracefully
    Unresolved,
}

/// Whether a media type has metadata worth discovering
pub fn wants_metadata(media: &MediaType) -> bool {
    matches!(media.preview_class(), PreviewClass::Image | PreviewClass::Paged)
}

#[derive(Debug, Clone)]
pub struct MetadataLoadRequest {
    pub ticket: LoadTicket,
    pub(crate) media: MediaType,
    pub(crate) bytes: Arc<[u8]>,
}

#[derive(Debug)]
pub struct MetadataLoadOutcome {
    pub ticket: LoadTicket,
    pub result: Result<DocumentMetadata>,
}

impl MetadataLoadRequest {
    /// Resolve page count or raster dimensions
    pub async fn run(self) -> MetadataLoadOutcome {
        let result = match self.media.preview_class() {
            PreviewClass::Paged => pdf::page_count(&self.bytes).map(DocumentMetadata::Pages),
            PreviewClass::Image => raster::probe(&self.bytes).map(DocumentMetadata::Raster),
            PreviewClass::Unsupported => Ok(DocumentMetadata::Unresolved),
        };
        MetadataLoadOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Result of applying a load outcome to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Applied,
    /// Selection moved on while the load was in flight
    Stale,
    /// The document could not be loaded; the message was shown to the user
    Rejected(String),
    /// Metadata could not be resolved; the view degraded
    Degraded(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use jewelviz_core::{Error, Point3f, TriangleMesh};
    use jewelviz_io::StlWriter;

    fn ticket() -> LoadTicket {
        LoadTicket {
            kind: DocumentKind::Mesh,
            document: DocumentId(1),
            generation: 1,
        }
    }

    #[test]
    fn test_load_mesh_normalizes_both_frames() {
        let mesh = TriangleMesh::from_triangle_soup(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(8.0, 0.0, 0.0),
            Point3f::new(0.0, 2.0, 1.0),
        ]);
        let loaded = load_mesh(&StlWriter::to_bytes(&mesh), 50.0, 100.0).unwrap();
        assert!((loaded.preview.bounds().max_extent() - 50.0).abs() < 1e-2);
        assert!((loaded.showcase.bounds().max_extent() - 100.0).abs() < 1e-2);
        assert_eq!(loaded.triangle_count(), 1);
    }

    #[test]
    fn test_degenerate_mesh_rejected() {
        let mesh = TriangleMesh::from_triangle_soup(vec![Point3f::new(1.0, 1.0, 1.0); 3]);
        let result = load_mesh(&StlWriter::to_bytes(&mesh), 50.0, 100.0);
        assert!(matches!(result, Err(Error::DegenerateGeometry(_))));
    }

    #[test]
    fn test_mesh_request_carries_ticket() {
        let request = MeshLoadRequest {
            ticket: ticket(),
            bytes: Arc::from(&b"short"[..]),
            preview_size: 50.0,
            showcase_size: 100.0,
        };
        let outcome = pollster::block_on(request.run());
        assert_eq!(outcome.ticket, ticket());
        assert!(matches!(outcome.result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_metadata_for_pdf() {
        let request = MetadataLoadRequest {
            ticket: ticket(),
            media: MediaType::Pdf,
            bytes: Arc::from(&b"%PDF-1.4\n1 0 obj << /Type /Pages /Count 4 >> endobj\n"[..]),
        };
        let outcome = pollster::block_on(request.run());
        assert_eq!(outcome.result.unwrap(), DocumentMetadata::Pages(4));
    }

    #[test]
    fn test_wants_metadata() {
        assert!(wants_metadata(&MediaType::Pdf));
        assert!(!wants_metadata(&MediaType::WordDocument));
    }
}
