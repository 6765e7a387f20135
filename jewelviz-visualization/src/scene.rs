//! GPU-ready scene description for the mesh viewports
//!
//! A [`MeshScene`] bundles everything a renderer needs to draw one normalized
//! mesh: a vertex buffer, an index buffer and the uniform blocks for the
//! material, camera and lighting. All uniform structs are `Pod` so they can be
//! uploaded byte-for-byte.

use crate::{camera::Camera, material::MaterialPreset};
use bytemuck::{Pod, Zeroable};
use jewelviz_core::{Aabb, CanonicalFrame, Error, NormalizedGeometry, Result, Vector3f};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Vertex data for mesh rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Camera uniform buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub _padding: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection().into(),
            view_pos: camera.position.coords.into(),
            _padding: 0.0,
        }
    }
}

/// Physically-based material uniform, colours in linear space
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 3],
    pub metalness: f32,
    pub specular_color: [f32; 3],
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub env_map_intensity: f32,
    pub reflectivity: f32,
    pub transmission: f32,
    pub ior: f32,
    pub specular_intensity: f32,
    pub thickness: f32,
    pub normal_scale: [f32; 2],
    pub _padding: [f32; 2],
}

impl From<&MaterialPreset> for MaterialUniform {
    fn from(preset: &MaterialPreset) -> Self {
        Self {
            base_color: preset.base_color.to_linear(),
            metalness: preset.metalness,
            specular_color: preset.specular_color.to_linear(),
            roughness: preset.roughness,
            clearcoat: preset.clearcoat,
            clearcoat_roughness: preset.clearcoat_roughness,
            env_map_intensity: preset.env_map_intensity,
            reflectivity: preset.reflectivity,
            transmission: preset.transmission,
            ior: preset.ior,
            specular_intensity: preset.specular_intensity,
            thickness: preset.thickness,
            normal_scale: preset.normal_scale,
            _padding: [0.0; 2],
        }
    }
}

/// A positioned light source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: [f32; 3],
    pub intensity: f32,
}

impl Light {
    pub const fn new(position: [f32; 3], intensity: f32) -> Self {
        Self {
            position,
            intensity,
        }
    }

    fn packed(light: Option<Light>) -> [f32; 4] {
        light.map_or([0.0; 4], |l| {
            [l.position[0], l.position[1], l.position[2], l.intensity]
        })
    }
}

/// Studio lighting for one canonical frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightingRig {
    pub ambient: f32,
    pub key: Light,
    pub fill: Option<Light>,
    pub accent: Option<Light>,
    pub environment: f32,
    pub exposure: f32,
}

impl LightingRig {
    /// Bright studio setup for the interactive preview
    pub fn preview() -> Self {
        Self {
            ambient: 0.8,
            key: Light::new([100.0, 100.0, 100.0], 2.0),
            fill: Some(Light::new([-100.0, -100.0, -100.0], 1.0)),
            accent: Some(Light::new([-50.0, 50.0, -50.0], 0.8)),
            environment: 2.5,
            exposure: 1.5,
        }
    }

    /// Neutral setup for the rendered-material pane
    pub fn showcase() -> Self {
        Self {
            ambient: 1.0,
            key: Light::new([100.0, 100.0, 100.0], 1.0),
            fill: None,
            accent: None,
            environment: 1.0,
            exposure: 1.0,
        }
    }

    pub fn for_frame(frame: CanonicalFrame) -> Self {
        match frame {
            CanonicalFrame::Preview => Self::preview(),
            CanonicalFrame::Showcase => Self::showcase(),
        }
    }

    pub fn to_uniform(&self) -> LightingUniform {
        LightingUniform {
            key: Light::packed(Some(self.key)),
            fill: Light::packed(self.fill),
            accent: Light::packed(self.accent),
            ambient: self.ambient,
            environment: self.environment,
            exposure: self.exposure,
            _padding: 0.0,
        }
    }
}

/// Lighting uniform: each light packs position in xyz and intensity in w
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LightingUniform {
    pub key: [f32; 4],
    pub fill: [f32; 4],
    pub accent: [f32; 4],
    pub ambient: f32,
    pub environment: f32,
    pub exposure: f32,
    pub _padding: f32,
}

/// Everything needed to draw one mesh viewport
#[derive(Debug, Clone)]
pub struct MeshScene {
    pub vertices: Vec<SceneVertex>,
    pub indices: Vec<u32>,
    pub material: MaterialUniform,
    pub camera: CameraUniform,
    pub lighting: LightingUniform,
    pub bounds: Aabb,
    pub preset_label: &'static str,
}

impl MeshScene {
    /// Compose a scene from normalized geometry and its viewport settings
    pub fn compose(
        geometry: &NormalizedGeometry,
        camera: &Camera,
        preset: &'static MaterialPreset,
        lighting: &LightingRig,
    ) -> Result<Self> {
        let mesh = geometry.mesh();
        if !mesh.has_valid_indices() {
            return Err(Error::InvalidData("face references a missing vertex".to_string()));
        }

        let normals: Vec<Vector3f> = match &mesh.normals {
            Some(n) if n.len() == mesh.vertex_count() => n.clone(),
            _ => {
                let mut with_normals = mesh.clone();
                with_normals.compute_vertex_normals();
                with_normals.normals.unwrap_or_default()
            }
        };

        let vertices = mesh
            .vertices
            .iter()
            .zip(normals.iter().chain(std::iter::repeat(&Vector3f::zeros())))
            .map(|(p, n)| SceneVertex {
                position: p.coords.into(),
                normal: (*n).into(),
            })
            .collect();

        let indices = mesh
            .faces
            .iter()
            .flatten()
            .map(|&i| u32::try_from(i))
            .collect::<std::result::Result<Vec<u32>, _>>()
            .map_err(|_| Error::InvalidData("mesh too large for 32-bit indices".to_string()))?;

        tracing::debug!(
            triangles = mesh.face_count(),
            material = preset.label,
            "Composed mesh scene"
        );

        Ok(Self {
            vertices,
            indices,
            material: MaterialUniform::from(preset),
            camera: CameraUniform::from_camera(camera),
            lighting: lighting.to_uniform(),
            bounds: *geometry.bounds(),
            preset_label: preset.label,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex buffer contents
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer contents
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn eye(&self) -> Point3<f32> {
        Point3::from(self.camera.view_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        camera::Framing,
        material::{PresetId, RENDER_METALS},
    };
    use approx::assert_relative_eq;
    use jewelviz_core::{normalize, Point3f, TriangleMesh};

    fn pyramid() -> TriangleMesh {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(2.0, 0.0, 0.0);
        let c = Point3f::new(0.0, 2.0, 0.0);
        let d = Point3f::new(0.0, 0.0, 2.0);
        TriangleMesh::from_triangle_soup(vec![a, c, b, a, b, d, a, d, c, b, c, d])
    }

    #[test]
    fn test_uniform_layouts() {
        assert_eq!(std::mem::size_of::<SceneVertex>(), 24);
        assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<MaterialUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<LightingUniform>() % 16, 0);
    }

    #[test]
    fn test_compose_preview_scene() {
        let geometry = normalize(&pyramid(), 50.0).unwrap();
        let camera = Camera::frame(geometry.bounds(), &Framing::preview(), 1.0);
        let preset = PresetId::DarkGreen.preset();
        let scene = MeshScene::compose(&geometry, &camera, preset, &LightingRig::preview()).unwrap();

        assert_eq!(scene.vertices.len(), 12);
        assert_eq!(scene.triangle_count(), 4);
        assert_eq!(scene.vertex_bytes().len(), 12 * 24);
        assert_eq!(scene.index_bytes().len(), 12 * 4);
        assert_relative_eq!(scene.eye(), Point3::new(75.0, 75.0, 75.0));
        assert_eq!(scene.lighting.ambient, 0.8);
        assert_eq!(scene.lighting.exposure, 1.5);
        assert_eq!(scene.preset_label, "Dark Green");
    }

    #[test]
    fn test_compose_fills_missing_normals() {
        let geometry = normalize(&pyramid(), 100.0).unwrap();
        assert!(geometry.mesh().normals.is_none());
        let camera = Camera::frame(geometry.bounds(), &Framing::showcase(), 1.0);
        let preset = RENDER_METALS.select_or_default("Platinum");
        let scene = MeshScene::compose(&geometry, &camera, preset, &LightingRig::showcase()).unwrap();

        for v in &scene.vertices {
            let n = Vector3f::from(v.normal);
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-4);
        }
        assert_eq!(scene.material.metalness, 0.7);
        assert_eq!(scene.material.base_color, preset.base_color.to_linear());
    }

    #[test]
    fn test_showcase_rig_has_single_light() {
        let uniform = LightingRig::showcase().to_uniform();
        assert_eq!(uniform.key, [100.0, 100.0, 100.0, 1.0]);
        assert_eq!(uniform.fill, [0.0; 4]);
        assert_eq!(uniform.accent, [0.0; 4]);
        assert_eq!(LightingRig::for_frame(CanonicalFrame::Showcase), LightingRig::showcase());
    }
}
