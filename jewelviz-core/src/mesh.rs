//! Mesh data structures and functionality

use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    /// Create an unindexed mesh where every three consecutive vertices form a face
    pub fn from_triangle_soup(vertices: Vec<Point3f>) -> Self {
        let faces = (0..vertices.len() / 3)
            .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
            .collect();
        Self::from_vertices_and_faces(vertices, faces)
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Corner positions of a face, or `None` if it references a missing vertex
    pub fn face_vertices(&self, face: &[usize; 3]) -> Option<[Point3f; 3]> {
        Some([
            *self.vertices.get(face[0])?,
            *self.vertices.get(face[1])?,
            *self.vertices.get(face[2])?,
        ])
    }

    /// Normal of a single face from its winding.
    ///
    /// Zero-area faces and faces with out-of-range indices yield the zero vector.
    pub fn face_normal(&self, face: &[usize; 3]) -> Vector3f {
        let Some([v0, v1, v2]) = self.face_vertices(face) else {
            return Vector3f::zeros();
        };

        let cross = (v1 - v0).cross(&(v2 - v0));
        cross.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros)
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces.iter().map(|face| self.face_normal(face)).collect()
    }

    /// Compute per-vertex normals by accumulating area-weighted face normals.
    /// Faces with out-of-range indices are skipped.
    pub fn compute_vertex_normals(&mut self) {
        let mut accum = vec![Vector3f::zeros(); self.vertices.len()];

        for face in &self.faces {
            let Some([v0, v1, v2]) = self.face_vertices(face) else {
                continue;
            };
            // Unnormalized cross product is proportional to face area
            let weighted = (v1 - v0).cross(&(v2 - v0));
            for &i in face {
                accum[i] += weighted;
            }
        }

        let normals = accum
            .into_iter()
            .map(|n| n.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros))
            .collect();
        self.normals = Some(normals);
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Check that every face references an existing vertex
    pub fn has_valid_indices(&self) -> bool {
        let n = self.vertices.len();
        self.faces.iter().all(|f| f.iter().all(|&i| i < n))
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.normals = None;
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> TriangleMesh {
        TriangleMesh::from_triangle_soup(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn test_triangle_soup_faces() {
        let mut vertices = unit_triangle().vertices;
        vertices.extend(unit_triangle().vertices);
        let mesh = TriangleMesh::from_triangle_soup(vertices);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.faces[1], [3, 4, 5]);
        assert!(mesh.has_valid_indices());
    }

    #[test]
    fn test_face_normals() {
        let mesh = unit_triangle();
        let normals = mesh.calculate_face_normals();
        assert_eq!(normals.len(), 1);
        assert_relative_eq!(normals[0].z, 1.0);
    }

    #[test]
    fn test_degenerate_face_normal_is_zero() {
        let mesh = TriangleMesh::from_triangle_soup(vec![Point3f::new(1.0, 1.0, 1.0); 3]);
        assert_eq!(mesh.calculate_face_normals()[0], Vector3f::zeros());
    }

    #[test]
    fn test_out_of_range_face_does_not_panic() {
        let mut mesh = unit_triangle();
        mesh.add_face([0, 1, 7]);
        assert!(!mesh.has_valid_indices());
        assert!(mesh.face_vertices(&[0, 1, 7]).is_none());

        let normals = mesh.calculate_face_normals();
        assert_relative_eq!(normals[0].z, 1.0);
        assert_eq!(normals[1], Vector3f::zeros());

        mesh.compute_vertex_normals();
        for n in mesh.normals.as_ref().unwrap() {
            assert_relative_eq!(n.z, 1.0);
        }
    }

    #[test]
    fn test_vertex_normals() {
        let mut mesh = unit_triangle();
        mesh.compute_vertex_normals();
        let normals = mesh.normals.as_ref().unwrap();
        assert_eq!(normals.len(), 3);
        for n in normals {
            assert_relative_eq!(n.z, 1.0);
        }
    }

    #[test]
    fn test_set_normals_rejects_wrong_length() {
        let mut mesh = unit_triangle();
        mesh.set_normals(vec![Vector3f::z()]);
        assert!(mesh.normals.is_none());
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = TriangleMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }
}
