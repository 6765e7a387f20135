//! Core traits for jewelviz

use crate::{bounds::Aabb, mesh::*, point::*, transform::Transform3D};

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object, `None` when it has no vertices
    fn bounding_box(&self) -> Option<Aabb>;

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        self.bounding_box()
            .map(|b| b.center())
            .unwrap_or_else(Point3f::origin)
    }
}

/// Trait for objects that can be transformed
pub trait Transformable {
    /// Apply a transformation to the object
    fn transform(&mut self, transform: &Transform3D);
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }
}

impl Transformable for TriangleMesh {
    fn transform(&mut self, transform: &Transform3D) {
        for vertex in &mut self.vertices {
            *vertex = transform.transform_point(vertex);
        }

        if let Some(normals) = &mut self.normals {
            for normal in normals.iter_mut() {
                let n = transform.transform_vector(normal);
                *normal = n.try_normalize(f32::EPSILON).unwrap_or(*normal);
            }
        }
    }
}
