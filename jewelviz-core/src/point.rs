//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Component-wise minimum of two points
pub fn component_min(a: &Point3f, b: &Point3f) -> Point3f {
    Point3f::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
}

/// Component-wise maximum of two points
pub fn component_max(a: &Point3f, b: &Point3f) -> Point3f {
    Point3f::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}

/// Whether every coordinate of the point is finite
pub fn is_finite(p: &Point3f) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_min_max() {
        let a = Point3f::new(1.0, -2.0, 3.0);
        let b = Point3f::new(-1.0, 2.0, 3.5);
        assert_eq!(component_min(&a, &b), Point3f::new(-1.0, -2.0, 3.0));
        assert_eq!(component_max(&a, &b), Point3f::new(1.0, 2.0, 3.5));
    }

    #[test]
    fn test_is_finite() {
        assert!(is_finite(&Point3f::new(0.0, 1.0, 2.0)));
        assert!(!is_finite(&Point3f::new(f32::NAN, 1.0, 2.0)));
        assert!(!is_finite(&Point3f::new(0.0, f32::INFINITY, 2.0)));
    }
}
