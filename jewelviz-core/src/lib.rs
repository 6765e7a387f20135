//! Core data structures and traits for jewelviz
//!
//! This crate provides the geometric foundation of the viewer: points, triangle
//! meshes, bounding boxes, transforms, normalization into the canonical viewing
//! frame, and the error taxonomy shared by every other jewelviz crate.

pub mod point;
pub mod mesh;
pub mod bounds;
pub mod traits;
pub mod transform;
pub mod normalize;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use bounds::*;
pub use traits::*;
pub use transform::*;
pub use normalize::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3};
