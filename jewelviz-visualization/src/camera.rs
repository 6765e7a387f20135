//! Camera framing for normalized meshes
//!
//! Cameras are placed on the (1, 1, 1) diagonal above the bounding-box centre
//! at a distance proportional to the canonical size, so every normalized mesh
//! is framed identically regardless of its source dimensions.

use jewelviz_core::{Aabb, CanonicalFrame};
use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertical field of view used by every framing preset
pub const DEFAULT_FOV: f32 = std::f32::consts::FRAC_PI_4;

/// Smallest polar angle the orbit may reach, keeps `look_at` away from the up axis
const POLE_EPSILON: f32 = 1e-3;

/// Framing rules for one canonical frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Framing {
    /// Largest dimension of the normalized mesh
    pub canonical_size: f32,
    /// Camera offset along each axis, as a multiple of the canonical size
    pub offset_ratio: f32,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Closest orbit distance
    pub min_distance: f32,
    /// Farthest orbit distance
    pub max_distance: f32,
}

impl Framing {
    /// Interactive mesh pane: 50 units, camera at (75, 75, 75)
    pub fn preview() -> Self {
        Self {
            canonical_size: CanonicalFrame::Preview.default_size(),
            offset_ratio: 1.5,
            fov: DEFAULT_FOV,
            min_distance: 50.0,
            max_distance: 500.0,
        }
    }

    /// Rendered-material pane: 100 units, camera at (200, 200, 200)
    pub fn showcase() -> Self {
        Self {
            canonical_size: CanonicalFrame::Showcase.default_size(),
            offset_ratio: 2.0,
            fov: DEFAULT_FOV,
            min_distance: 50.0,
            max_distance: 400.0,
        }
    }

    /// Preset for a canonical frame, optionally with a configured size
    pub fn for_frame(frame: CanonicalFrame, canonical_size: Option<f32>) -> Self {
        let mut framing = match frame {
            CanonicalFrame::Preview => Self::preview(),
            CanonicalFrame::Showcase => Self::showcase(),
        };
        if let Some(size) = canonical_size {
            framing.canonical_size = size;
        }
        framing
    }

    /// Offset from the target to the framed camera position
    pub fn offset(&self) -> Vector3<f32> {
        Vector3::repeat(self.canonical_size * self.offset_ratio)
    }
}

/// A perspective camera orbiting a target
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let distance = (position - target).norm();
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
            min_distance: 0.0,
            max_distance: distance.max(far),
        }
    }

    /// Frame a bounding box using the given preset.
    ///
    /// The target is the box centre, which is the origin for normalized
    /// geometry. Clip planes follow the framed distance.
    pub fn frame(bounds: &Aabb, framing: &Framing, aspect_ratio: f32) -> Self {
        let target = bounds.center();
        let position = target + framing.offset();
        let distance = framing.offset().norm();
        let reach = framing.max_distance.max(distance) + bounds.bounding_radius();

        let camera = Self {
            position,
            target,
            up: Vector3::y(),
            fov: framing.fov,
            aspect_ratio: sanitize_aspect(aspect_ratio),
            near: (distance * 0.01).max(0.01),
            far: reach * 2.0,
            min_distance: framing.min_distance,
            max_distance: framing.max_distance,
        };

        tracing::debug!(
            distance,
            canonical_size = framing.canonical_size,
            "Framed camera"
        );
        camera
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    /// Combined projection * view matrix
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Distance from the camera to its target
    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Update the aspect ratio after a viewport resize
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = sanitize_aspect(aspect_ratio);
    }

    /// Dolly towards (`factor > 1`) or away from the target within the orbit limits
    pub fn zoom(&mut self, factor: f32) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let offset = self.position - self.target;
        let distance = offset.norm();
        if distance <= f32::EPSILON {
            return;
        }
        let new_distance = (distance / factor).clamp(self.min_distance, self.max_distance);
        self.position = self.target + offset * (new_distance / distance);
    }

    /// Rotate the camera around the target.
    ///
    /// `yaw` turns around the up axis, `pitch` changes the polar angle, which
    /// stays within `[0, π]`.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius <= f32::EPSILON {
            return;
        }

        let theta = offset.x.atan2(offset.z) + yaw;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + pitch)
            .clamp(POLE_EPSILON, std::f32::consts::PI - POLE_EPSILON);

        let direction = Vector3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos());
        self.position = self.target + direction * radius;
    }

    /// Whether a sphere lies entirely inside the view frustum
    pub fn contains_sphere(&self, center: &Point3<f32>, radius: f32) -> bool {
        let forward = match (self.target - self.position).try_normalize(f32::EPSILON) {
            Some(f) => f,
            None => return false,
        };
        let to_center = center - self.position;
        let distance = to_center.norm();
        if distance <= radius || distance - radius < self.near || distance + radius > self.far {
            return false;
        }

        let half_vertical = self.fov * 0.5;
        let half_horizontal = ((half_vertical.tan()) * self.aspect_ratio).atan();
        let half_angle = half_vertical.min(half_horizontal);

        let off_axis = (to_center.dot(&forward) / distance).clamp(-1.0, 1.0).acos();
        let angular_radius = (radius / distance).asin();
        off_axis + angular_radius <= half_angle
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            DEFAULT_FOV,
            16.0 / 9.0,
            0.1,
            100.0,
        )
    }
}

fn sanitize_aspect(aspect_ratio: f32) -> f32 {
    if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        1.0
    }
}
