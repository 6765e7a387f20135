//! Geometric normalization into the canonical viewing frame
//!
//! Every mesh is recentred on the centre of its bounding box and scaled
//! uniformly so that its largest bounding-box dimension equals a fixed
//! canonical size. Cameras and lights are then positioned in canonical units
//! and never need to know the raw size of the uploaded model.

use crate::{
    bounds::Aabb,
    error::{Error, Result},
    mesh::TriangleMesh,
    traits::{Drawable, Transformable},
    transform::Transform3D,
};
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing normalized coordinates
pub const NORMALIZATION_TOLERANCE: f32 = 1e-4;

/// Named canonical frames used by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalFrame {
    /// Interactive mesh preview pane
    Preview,
    /// Rendered-material pane
    Showcase,
}

impl CanonicalFrame {
    /// Default size of the frame's largest dimension, in scene units
    pub const fn default_size(self) -> f32 {
        match self {
            CanonicalFrame::Preview => 50.0,
            CanonicalFrame::Showcase => 100.0,
        }
    }
}

/// A mesh recentred and rescaled into a canonical frame
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGeometry {
    mesh: TriangleMesh,
    canonical_size: f32,
    bounds: Aabb,
    source_bounds: Aabb,
    scale: f32,
    transform: Transform3D,
}

impl NormalizedGeometry {
    /// The transformed mesh
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// Consume and return the transformed mesh
    pub fn into_mesh(self) -> TriangleMesh {
        self.mesh
    }

    /// Size the largest dimension was scaled to
    pub fn canonical_size(&self) -> f32 {
        self.canonical_size
    }

    /// Bounding box after normalization, centred on the origin
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Bounding box of the mesh before normalization
    pub fn source_bounds(&self) -> &Aabb {
        &self.source_bounds
    }

    /// Uniform scale factor that was applied
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Transformation mapping source coordinates into the canonical frame
    pub fn transform(&self) -> &Transform3D {
        &self.transform
    }

    /// Normalize this geometry again into another canonical size
    pub fn renormalize(&self, canonical_size: f32) -> Result<NormalizedGeometry> {
        normalize(&self.mesh, canonical_size)
    }
}

/// Recentre and uniformly rescale `mesh` so its largest bounding-box dimension
/// equals `canonical_size`.
///
/// The input is left untouched. Fails with [`Error::DegenerateGeometry`] when
/// the mesh has no faces or its bounding box collapses to a point.
pub fn normalize(mesh: &TriangleMesh, canonical_size: f32) -> Result<NormalizedGeometry> {
    if !(canonical_size.is_finite() && canonical_size > 0.0) {
        return Err(Error::InvalidData(format!(
            "canonical size must be positive and finite, got {}",
            canonical_size
        )));
    }

    if mesh.is_empty() {
        return Err(Error::DegenerateGeometry("mesh has no triangles".to_string()));
    }

    let source_bounds = mesh
        .bounding_box()
        .ok_or_else(|| Error::DegenerateGeometry("mesh has no vertices".to_string()))?;

    let max_extent = source_bounds.max_extent();
    let scale = canonical_size / max_extent;
    if !(max_extent > 0.0) || !scale.is_finite() {
        return Err(Error::DegenerateGeometry(format!(
            "bounding box has zero extent (max dimension {})",
            max_extent
        )));
    }

    let transform = Transform3D::recenter_and_scale(&source_bounds.center(), scale);
    let mut normalized = mesh.clone();
    normalized.transform(&transform);

    let bounds = normalized
        .bounding_box()
        .ok_or_else(|| Error::DegenerateGeometry("mesh has no vertices".to_string()))?;

    tracing::debug!(
        vertices = normalized.vertex_count(),
        canonical_size,
        scale,
        "Normalized mesh into canonical frame"
    );

    Ok(NormalizedGeometry {
        mesh: normalized,
        canonical_size,
        bounds,
        source_bounds,
        scale,
        transform,
    })
}
