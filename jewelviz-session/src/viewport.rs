//! Per-viewport state
//!
//! Every [`ViewportId`] owns its own pane. Two panes showing the same
//! document never share zoom, page, camera or material state.

use crate::{
    document::DocumentId,
    layout::{ViewportId, ViewportKind},
    loader::DocumentMetadata,
};
use jewelviz_core::{Aabb, CanonicalFrame};
use jewelviz_visualization::{
    Camera, DocumentView, Framing, MaterialCatalog, MaterialPreset, PREVIEW_FINISHES,
    RENDER_METALS,
};
use serde::Serialize;

/// Default aspect ratio until the host reports a viewport size
pub const DEFAULT_ASPECT: f32 = 16.0 / 9.0;

/// 2D pane showing the active design reference
#[derive(Debug, Clone, Default)]
pub struct DesignPane {
    pub document: Option<DocumentId>,
    pub view: Option<DocumentView>,
}

impl DesignPane {
    /// Point the pane at a document, resetting its view when the document changes
    pub(crate) fn show(&mut self, document: Option<(DocumentId, DocumentView)>) {
        match document {
            Some((id, view)) if self.document != Some(id) => {
                self.document = Some(id);
                self.view = Some(view);
            }
            Some(_) => {}
            None => {
                self.document = None;
                self.view = None;
            }
        }
    }

    /// Fold discovered metadata into the view
    pub(crate) fn apply_metadata(&mut self, metadata: &DocumentMetadata) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        match (metadata, view.page_count()) {
            (DocumentMetadata::Pages(n), Some(_)) => view.resolve_pages(Some(*n)),
            (DocumentMetadata::Unresolved, Some(_)) => view.resolve_pages(None),
            (DocumentMetadata::Raster(info), None) => view.set_dimensions(*info),
            _ => {}
        }
    }
}

/// 3D pane showing the active mesh
#[derive(Debug, Clone)]
pub struct MeshPane {
    pub frame: CanonicalFrame,
    pub document: Option<DocumentId>,
    pub camera: Option<Camera>,
    pub preset: &'static MaterialPreset,
    pub aspect_ratio: f32,
    catalog: &'static MaterialCatalog,
}

impl MeshPane {
    pub fn new(frame: CanonicalFrame) -> Self {
        let catalog = match frame {
            CanonicalFrame::Preview => &PREVIEW_FINISHES,
            CanonicalFrame::Showcase => &RENDER_METALS,
        };
        Self {
            frame,
            document: None,
            camera: None,
            preset: catalog.default_preset(),
            aspect_ratio: DEFAULT_ASPECT,
            catalog,
        }
    }

    pub fn catalog(&self) -> &'static MaterialCatalog {
        self.catalog
    }

    /// Choose a material from this pane's catalog, falling back to its default
    pub fn select_material(&mut self, label: &str) -> &'static MaterialPreset {
        self.preset = self.catalog.select_or_default(label);
        self.preset
    }

    /// Show a mesh, reframing the camera when the mesh changes
    pub(crate) fn show(&mut self, document: Option<(DocumentId, &Aabb)>, framing: &Framing) {
        match document {
            Some((id, bounds)) if self.document != Some(id) => {
                self.document = Some(id);
                self.camera = Some(Camera::frame(bounds, framing, self.aspect_ratio));
            }
            Some(_) => {}
            None => {
                self.document = None;
                self.camera = None;
            }
        }
    }

    pub(crate) fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        if let Some(camera) = self.camera.as_mut() {
            camera.set_aspect_ratio(aspect_ratio);
        }
    }
}

#[derive(Debug, Clone)]
pub enum Pane {
    Design(DesignPane),
    Mesh(MeshPane),
}

impl Pane {
    pub fn for_viewport(id: ViewportId) -> Self {
        match id.kind() {
            ViewportKind::Design => Pane::Design(DesignPane::default()),
            ViewportKind::Mesh => Pane::Mesh(MeshPane::new(CanonicalFrame::Preview)),
            ViewportKind::Render => Pane::Mesh(MeshPane::new(CanonicalFrame::Showcase)),
        }
    }

    pub fn as_design(&self) -> Option<&DesignPane> {
        match self {
            Pane::Design(pane) => Some(pane),
            Pane::Mesh(_) => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshPane> {
        match self {
            Pane::Mesh(pane) => Some(pane),
            Pane::Design(_) => None,
        }
    }
}

/// What a viewport is doing right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ViewportStatus {
    /// Nothing to show
    Idle,
    Loading,
    Ready,
    /// Inline error shown in place of the document
    Failed(String),
}

/// Description of one visible viewport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewportFrame {
    pub id: ViewportId,
    pub inert: bool,
    pub status: ViewportStatus,
    pub document: Option<DocumentId>,
    pub name: Option<String>,
    /// 2D view state, for design viewports
    pub view: Option<DocumentView>,
    /// Material label, for mesh viewports
    pub material: Option<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jewelviz_core::Point3f;
    use jewelviz_io::MediaType;
    use jewelviz_visualization::PageCount;

    #[test]
    fn test_panes_follow_viewport_kind() {
        let render = Pane::for_viewport(ViewportId::TripleRender);
        let pane = render.as_mesh().unwrap();
        assert_eq!(pane.frame, CanonicalFrame::Showcase);
        assert_eq!(pane.preset.label, "22kt Gold");

        let mesh = Pane::for_viewport(ViewportId::SplitMesh);
        assert_eq!(mesh.as_mesh().unwrap().preset.label, "Dark Green");
        assert!(Pane::for_viewport(ViewportId::TabbedDesign).as_design().is_some());
    }

    #[test]
    fn test_mesh_pane_reframes_only_on_change() {
        let mut pane = MeshPane::new(CanonicalFrame::Preview);
        let bounds = Aabb::new(Point3f::new(-25.0, -25.0, -25.0), Point3f::new(25.0, 25.0, 25.0));
        let framing = Framing::preview();

        pane.show(Some((DocumentId(1), &bounds)), &framing);
        pane.camera.as_mut().unwrap().zoom(2.0);
        let zoomed = pane.camera.clone();

        pane.show(Some((DocumentId(1), &bounds)), &framing);
        assert_eq!(pane.camera, zoomed);

        pane.show(Some((DocumentId(2), &bounds)), &framing);
        assert_ne!(pane.camera, zoomed);

        pane.show(None, &framing);
        assert!(pane.camera.is_none());
    }

    #[test]
    fn test_material_selection_stays_in_catalog() {
        let mut pane = MeshPane::new(CanonicalFrame::Showcase);
        assert_eq!(pane.select_material("Platinum").label, "Platinum");
        assert_eq!(pane.select_material("Dark Green").label, "22kt Gold");
    }

    #[test]
    fn test_design_pane_metadata() {
        let mut pane = DesignPane::default();
        let view = DocumentView::for_media("a.pdf", &MediaType::Pdf);
        pane.show(Some((DocumentId(3), view)));
        pane.apply_metadata(&DocumentMetadata::Pages(6));
        assert_eq!(
            pane.view.as_ref().unwrap().page_count(),
            Some(PageCount::Known(6))
        );

        pane.view.as_mut().unwrap().go_to_page(4);
        let again = DocumentView::for_media("a.pdf", &MediaType::Pdf);
        pane.show(Some((DocumentId(3), again)));
        assert_eq!(pane.view.as_ref().unwrap().page(), Some(4));
    }
}
