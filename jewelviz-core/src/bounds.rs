//! Axis-aligned bounding boxes

use crate::point::*;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3f,
    pub max: Point3f,
}

impl Aabb {
    /// Create a box from its corners
    pub fn new(min: Point3f, max: Point3f) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing all points, or `None` for an empty slice
    pub fn from_points(points: &[Point3f]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;

        for p in &points[1..] {
            min = component_min(&min, p);
            max = component_max(&max, p);
        }

        Some(Self { min, max })
    }

    /// Mean of the box extrema
    pub fn center(&self) -> Point3f {
        Point3f::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Box size along each axis
    pub fn extents(&self) -> Vector3f {
        self.max - self.min
    }

    /// Largest of the three axis extents
    pub fn max_extent(&self) -> f32 {
        let e = self.extents();
        e.x.max(e.y).max(e.z)
    }

    /// Radius of the sphere circumscribing the box
    pub fn bounding_radius(&self) -> f32 {
        self.extents().norm() / 2.0
    }

    /// Grow the box to include another one
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: component_min(&self.min, &other.min),
            max: component_max(&self.max, &other.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_points() {
        let points = vec![
            Point3f::new(1.0, 2.0, 3.0),
            Point3f::new(-1.0, 5.0, 0.0),
            Point3f::new(0.0, 0.0, 4.0),
        ];
        let aabb = Aabb::from_points(&points).unwrap();
        assert_eq!(aabb.min, Point3f::new(-1.0, 0.0, 0.0));
        assert_eq!(aabb.max, Point3f::new(1.0, 5.0, 4.0));
        assert_eq!(aabb.center(), Point3f::new(0.0, 2.5, 2.0));
        assert_relative_eq!(aabb.max_extent(), 5.0);
    }

    #[test]
    fn test_empty_points() {
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounding_radius_of_unit_cube() {
        let aabb = Aabb::new(Point3f::new(-0.5, -0.5, -0.5), Point3f::new(0.5, 0.5, 0.5));
        assert_relative_eq!(aabb.bounding_radius(), 3.0_f32.sqrt() / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_union() {
        let a = Aabb::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3f::new(-1.0, 0.5, 0.0), Point3f::new(0.5, 2.0, 1.0));
        let u = a.union(&b);
        assert_eq!(u.min, Point3f::new(-1.0, 0.0, 0.0));
        assert_eq!(u.max, Point3f::new(1.0, 2.0, 1.0));
    }
}
