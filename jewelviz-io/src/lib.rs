//! I/O operations for jewelry design documents
//!
//! This crate decodes binary STL meshes, detects the media type of uploaded
//! documents and probes document metadata (PDF page counts, raster image
//! dimensions) without rendering anything.

pub mod stl;
pub mod media;
pub mod pdf;
pub mod raster;
pub mod error;

pub use error::*;
pub use media::{ImageFormat, MediaType, PreviewClass};
pub use raster::RasterInfo;
pub use stl::{StlReader, StlWriter};

use jewelviz_core::{Result, TriangleMesh};

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<std::path::Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<std::path::Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<std::path::Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("stl") => stl::StlReader::read_mesh(path),
        _ => Err(jewelviz_core::Error::UnsupportedMedia(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Decode an in-memory mesh payload
pub fn parse_mesh(bytes: &[u8]) -> Result<TriangleMesh> {
    stl::StlReader::parse(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jewelviz_core::{Error, Point3f};
    use std::fs;

    fn triangle() -> TriangleMesh {
        TriangleMesh::from_triangle_soup(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn test_read_mesh_dispatches_on_extension() {
        let temp_file = "test_dispatch_mesh.STL";
        fs::write(temp_file, StlWriter::to_bytes(&triangle())).unwrap();

        let mesh = read_mesh(temp_file).unwrap();
        assert_eq!(mesh.face_count(), 1);

        let _ = fs::remove_file(temp_file);
    }

    #[test]
    fn test_read_mesh_unsupported_extension() {
        let result = read_mesh("ring.obj");
        assert!(matches!(result, Err(Error::UnsupportedMedia(_))));
    }

    #[test]
    fn test_parse_mesh_in_memory() {
        let bytes = StlWriter::to_bytes(&triangle());
        assert_eq!(parse_mesh(&bytes).unwrap().vertex_count(), 3);
    }
}
