//! Binary STL format support
//!
//! Layout: an 80-byte free-form header, a little-endian `u32` triangle count,
//! then one 50-byte record per triangle (facet normal, three vertices, and a
//! 16-bit attribute word). ASCII STL is not accepted.

use crate::{error::IoError, MeshReader, MeshWriter};
use jewelviz_core::{Point3f, Result, TriangleMesh, Vector3f};
use std::path::Path;

/// Size of the free-form header
pub const HEADER_LEN: usize = 80;

/// Size of one triangle record
pub const RECORD_LEN: usize = 50;

const PREAMBLE_LEN: usize = HEADER_LEN + 4;

pub struct StlReader;
pub struct StlWriter;

impl StlReader {
    /// Decode a binary STL payload into a triangle soup with per-vertex normals
    pub fn parse(bytes: &[u8]) -> Result<TriangleMesh> {
        Ok(decode(bytes)?)
    }

    /// Number of triangles declared in the payload header, if it is long enough
    pub fn declared_triangle_count(bytes: &[u8]) -> Option<u32> {
        let raw: [u8; 4] = bytes.get(HEADER_LEN..PREAMBLE_LEN)?.try_into().ok()?;
        Some(u32::from_le_bytes(raw))
    }
}

impl StlWriter {
    /// Encode a mesh as binary STL with facet normals computed from the winding.
    /// Faces that reference missing vertices are dropped.
    pub fn to_bytes(mesh: &TriangleMesh) -> Vec<u8> {
        let faces: Vec<_> = mesh
            .faces
            .iter()
            .filter_map(|face| Some((mesh.face_normal(face), mesh.face_vertices(face)?)))
            .collect();
        let mut out = Vec::with_capacity(PREAMBLE_LEN + faces.len() * RECORD_LEN);

        let mut header = [0u8; HEADER_LEN];
        let banner = b"jewelviz binary stl";
        header[..banner.len()].copy_from_slice(banner);
        out.extend_from_slice(&header);
        out.extend_from_slice(&(faces.len() as u32).to_le_bytes());

        for (normal, corners) in faces {
            write_vec3(&mut out, [normal.x, normal.y, normal.z]);
            for v in corners {
                write_vec3(&mut out, [v.x, v.y, v.z]);
            }
            out.extend_from_slice(&0u16.to_le_bytes());
        }

        out
    }
}

impl MeshReader for StlReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let bytes = std::fs::read(path)?;
        Self::parse(&bytes)
    }
}

impl MeshWriter for StlWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        std::fs::write(path, Self::to_bytes(mesh))?;
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> std::result::Result<TriangleMesh, IoError> {
    let triangles = StlReader::declared_triangle_count(bytes)
        .ok_or(IoError::HeaderTooShort { len: bytes.len() })?;

    let expected = (triangles as usize)
        .checked_mul(RECORD_LEN)
        .and_then(|n| n.checked_add(PREAMBLE_LEN))
        .unwrap_or(usize::MAX);

    if bytes.len() < expected {
        return Err(IoError::Truncated {
            triangles,
            expected,
            actual: bytes.len(),
        });
    }
    if bytes.len() != expected {
        return Err(IoError::LengthMismatch {
            triangles,
            expected,
            actual: bytes.len(),
        });
    }

    let count = triangles as usize;
    let mut vertices = Vec::with_capacity(count * 3);
    let mut normals = Vec::with_capacity(count * 3);

    for (t, record) in bytes[PREAMBLE_LEN..].chunks_exact(RECORD_LEN).enumerate() {
        let stored = read_vec3(record, 0);
        let corners = [read_vec3(record, 12), read_vec3(record, 24), read_vec3(record, 36)];

        let mut points = [Point3f::origin(); 3];
        for (slot, c) in points.iter_mut().zip(corners) {
            if !c.iter().all(|v| v.is_finite()) {
                return Err(IoError::NonFiniteCoordinate { triangle: t });
            }
            *slot = Point3f::new(c[0], c[1], c[2]);
        }

        let normal = facet_normal(stored, &points);
        vertices.extend_from_slice(&points);
        normals.extend_from_slice(&[normal; 3]);
    }

    let mut mesh = TriangleMesh::from_triangle_soup(vertices);
    mesh.set_normals(normals);

    tracing::debug!(triangles = count, "Decoded binary STL");
    Ok(mesh)
}

/// Stored facet normal when usable, otherwise one derived from the winding
fn facet_normal(stored: [f32; 3], points: &[Point3f; 3]) -> Vector3f {
    let n = Vector3f::new(stored[0], stored[1], stored[2]);
    if n.iter().all(|v| v.is_finite()) {
        if let Some(unit) = n.try_normalize(f32::EPSILON) {
            return unit;
        }
    }

    let cross = (points[1] - points[0]).cross(&(points[2] - points[0]));
    cross.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros)
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

fn read_vec3(data: &[u8], offset: usize) -> [f32; 3] {
    [
        read_f32(data, offset),
        read_f32(data, offset + 4),
        read_f32(data, offset + 8),
    ]
}

fn write_vec3(out: &mut Vec<u8>, v: [f32; 3]) {
    for c in v {
        out.extend_from_slice(&c.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use jewelviz_core::Error;

    fn tetrahedron() -> TriangleMesh {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(4.0, 0.0, 0.0);
        let c = Point3f::new(0.0, 2.0, 0.0);
        let d = Point3f::new(0.0, 0.0, 1.0);
        TriangleMesh::from_triangle_soup(vec![a, c, b, a, b, d, a, d, c, b, c, d])
    }

    #[test]
    fn test_parse_written_payload() {
        let bytes = StlWriter::to_bytes(&tetrahedron());
        assert_eq!(bytes.len(), 84 + 4 * 50);

        let mesh = StlReader::parse(&bytes).unwrap();
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.vertices[4], Point3f::new(4.0, 0.0, 0.0));
        assert_eq!(mesh.normals.as_ref().unwrap().len(), 12);
    }

    #[test]
    fn test_zero_normal_recomputed_from_winding() {
        let mut bytes = StlWriter::to_bytes(&TriangleMesh::from_triangle_soup(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ]));
        // Blank out the stored facet normal
        for b in &mut bytes[84..96] {
            *b = 0;
        }

        let mesh = StlReader::parse(&bytes).unwrap();
        let n = mesh.normals.unwrap()[0];
        assert_relative_eq!(n.z, 1.0);
    }

    #[test]
    fn test_writer_drops_faces_with_missing_vertices() {
        let mut mesh = TriangleMesh::from_triangle_soup(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ]);
        mesh.add_face([0, 2, 9]);

        let bytes = StlWriter::to_bytes(&mesh);
        assert_eq!(StlReader::declared_triangle_count(&bytes), Some(1));
        assert_eq!(StlReader::parse(&bytes).unwrap().face_count(), 1);
    }

    #[test]
    fn test_header_too_short() {
        let result = StlReader::parse(&[0u8; 40]);
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_truncated_records() {
        let bytes = StlWriter::to_bytes(&tetrahedron());
        let result = StlReader::parse(&bytes[..bytes.len() - 7]);
        match result {
            Err(Error::Parse { message }) => assert!(message.contains("truncated")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = StlWriter::to_bytes(&tetrahedron());
        bytes.extend_from_slice(&[0u8; 10]);
        assert!(matches!(StlReader::parse(&bytes), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_ascii_payload_rejected() {
        let ascii = b"solid ring\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid ring\n";
        assert!(matches!(StlReader::parse(ascii), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let mut bytes = StlWriter::to_bytes(&tetrahedron());
        let offset = 84 + 50 + 12;
        bytes[offset..offset + 4].copy_from_slice(&f32::NAN.to_le_bytes());
        match StlReader::parse(&bytes) {
            Err(Error::Parse { message }) => assert!(message.contains("triangle 1")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_triangles_parse_to_empty_mesh() {
        let bytes = StlWriter::to_bytes(&TriangleMesh::new());
        let mesh = StlReader::parse(&bytes).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_huge_declared_count_is_truncated_not_overflow() {
        let mut bytes = vec![0u8; 84];
        bytes[80..84].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(StlReader::parse(&bytes), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_path_round_trip() {
        let temp_file = "test_stl_round_trip.stl";
        StlWriter::write_mesh(&tetrahedron(), temp_file).unwrap();
        let mesh = StlReader::read_mesh(temp_file).unwrap();
        assert_eq!(mesh.face_count(), 4);
        let _ = std::fs::remove_file(temp_file);
    }
}
