//! Layout controller
//!
//! A small state machine deciding how many viewports are visible and what each
//! one shows. The active tab is only consulted in tabs mode. Render is enabled
//! solely by an explicit request and drops back to disabled whenever the
//! active mesh changes.

use crate::document::DocumentKind;
use jewelviz_core::Error;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Tabs,
    Split,
    Triple,
}

impl FromStr for LayoutMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tabs" => Ok(LayoutMode::Tabs),
            "split" => Ok(LayoutMode::Split),
            "triple" => Ok(LayoutMode::Triple),
            other => Err(Error::Config(format!("unknown layout mode '{}'", other))),
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayoutMode::Tabs => "tabs",
            LayoutMode::Split => "split",
            LayoutMode::Triple => "triple",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Design,
    Mesh,
    Render,
}

/// What a viewport displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportKind {
    /// Active design reference in a 2D viewer
    Design,
    /// Active mesh under a preview finish
    Mesh,
    /// Active mesh under a rendered metal
    Render,
}

/// Stable identity of every viewport slot. Each mode owns its own slots so
/// that zoom, page and camera state never leak between panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportId {
    TabbedDesign,
    TabbedMesh,
    TabbedRender,
    SplitDesign,
    SplitMesh,
    TripleDesign,
    TripleMesh,
    TripleRender,
}

impl ViewportId {
    pub const ALL: [ViewportId; 8] = [
        ViewportId::TabbedDesign,
        ViewportId::TabbedMesh,
        ViewportId::TabbedRender,
        ViewportId::SplitDesign,
        ViewportId::SplitMesh,
        ViewportId::TripleDesign,
        ViewportId::TripleMesh,
        ViewportId::TripleRender,
    ];

    pub fn kind(self) -> ViewportKind {
        match self {
            ViewportId::TabbedDesign | ViewportId::SplitDesign | ViewportId::TripleDesign => {
                ViewportKind::Design
            }
            ViewportId::TabbedMesh | ViewportId::SplitMesh | ViewportId::TripleMesh => {
                ViewportKind::Mesh
            }
            ViewportId::TabbedRender | ViewportId::TripleRender => ViewportKind::Render,
        }
    }

    pub fn mode(self) -> LayoutMode {
        match self {
            ViewportId::TabbedDesign | ViewportId::TabbedMesh | ViewportId::TabbedRender => {
                LayoutMode::Tabs
            }
            ViewportId::SplitDesign | ViewportId::SplitMesh => LayoutMode::Split,
            ViewportId::TripleDesign | ViewportId::TripleMesh | ViewportId::TripleRender => {
                LayoutMode::Triple
            }
        }
    }
}

/// A visible viewport slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewportSlot {
    pub id: ViewportId,
    /// Shown but not drawing: a render pane before render is enabled, or the
    /// mesh pane standing in for a render tab
    pub inert: bool,
}

impl ViewportSlot {
    fn live(id: ViewportId) -> Self {
        Self { id, inert: false }
    }
}

/// The render tab was requested before any render action
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[error("render tab is unavailable until a render is requested")]
pub struct TabRejected;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutState {
    pub mode: LayoutMode,
    pub active_tab: Tab,
    pub render_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutController {
    state: LayoutState,
}

impl LayoutController {
    pub fn new(mode: LayoutMode) -> Self {
        Self {
            state: LayoutState {
                mode,
                active_tab: Tab::Design,
                render_enabled: false,
            },
        }
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn mode(&self) -> LayoutMode {
        self.state.mode
    }

    pub fn active_tab(&self) -> Tab {
        self.state.active_tab
    }

    pub fn render_enabled(&self) -> bool {
        self.state.render_enabled
    }

    pub fn set_mode(&mut self, mode: LayoutMode) {
        self.state.mode = mode;
        tracing::debug!(%mode, "Layout mode changed");
    }

    pub fn set_active_tab(&mut self, tab: Tab) -> Result<(), TabRejected> {
        if tab == Tab::Render && !self.state.render_enabled {
            return Err(TabRejected);
        }
        self.state.active_tab = tab;
        Ok(())
    }

    /// Enable render for the active mesh. No-op without one.
    pub fn request_render(&mut self, mesh_renderable: bool) {
        if !mesh_renderable {
            return;
        }
        self.state.render_enabled = true;
        if self.state.mode == LayoutMode::Tabs {
            self.state.active_tab = Tab::Render;
        }
    }

    /// The active mesh changed: render must be requested again
    pub fn on_active_mesh_changed(&mut self) {
        self.state.render_enabled = false;
        if self.state.active_tab == Tab::Render {
            self.state.active_tab = Tab::Mesh;
        }
    }

    /// Bring the tab for freshly added documents forward (tabs mode only)
    pub fn focus(&mut self, kind: DocumentKind) {
        if self.state.mode != LayoutMode::Tabs {
            return;
        }
        self.state.active_tab = match kind {
            DocumentKind::DesignReference => Tab::Design,
            DocumentKind::Mesh => Tab::Mesh,
        };
    }

    /// Viewport slots visible in the current state, in display order
    pub fn visible_viewports(&self) -> Vec<ViewportSlot> {
        let enabled = self.state.render_enabled;
        match self.state.mode {
            LayoutMode::Tabs => match self.state.active_tab {
                Tab::Design => vec![ViewportSlot::live(ViewportId::TabbedDesign)],
                Tab::Mesh => vec![ViewportSlot::live(ViewportId::TabbedMesh)],
                Tab::Render if enabled => vec![ViewportSlot::live(ViewportId::TabbedRender)],
                Tab::Render => vec![ViewportSlot {
                    id: ViewportId::TabbedMesh,
                    inert: true,
                }],
            },
            LayoutMode::Split => vec![
                ViewportSlot::live(ViewportId::SplitDesign),
                ViewportSlot::live(ViewportId::SplitMesh),
            ],
            LayoutMode::Triple => vec![
                ViewportSlot::live(ViewportId::TripleDesign),
                ViewportSlot::live(ViewportId::TripleMesh),
                ViewportSlot {
                    id: ViewportId::TripleRender,
                    inert: !enabled,
                },
            ],
        }
    }
}

impl Default for LayoutController {
    fn default() -> Self {
        Self::new(LayoutMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tab_rejected_until_requested() {
        let mut layout = LayoutController::default();
        assert_eq!(layout.set_active_tab(Tab::Render), Err(TabRejected));
        assert_eq!(layout.active_tab(), Tab::Design);

        layout.request_render(true);
        assert_eq!(layout.active_tab(), Tab::Render);
        assert!(layout.set_active_tab(Tab::Mesh).is_ok());
        assert!(layout.set_active_tab(Tab::Render).is_ok());
    }

    #[test]
    fn test_request_render_without_mesh_is_noop() {
        for mode in [LayoutMode::Tabs, LayoutMode::Split, LayoutMode::Triple] {
            let mut layout = LayoutController::new(mode);
            let before = layout.clone();
            layout.request_render(false);
            assert_eq!(layout, before);
        }
    }

    #[test]
    fn test_request_render_idempotent() {
        for mode in [LayoutMode::Tabs, LayoutMode::Split, LayoutMode::Triple] {
            let mut once = LayoutController::new(mode);
            once.request_render(true);
            let mut twice = LayoutController::new(mode);
            twice.request_render(true);
            twice.request_render(true);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_request_render_outside_tabs_keeps_tab() {
        let mut layout = LayoutController::new(LayoutMode::Triple);
        layout.request_render(true);
        assert!(layout.render_enabled());
        assert_eq!(layout.active_tab(), Tab::Design);
    }

    #[test]
    fn test_mesh_change_resets_render() {
        let mut layout = LayoutController::default();
        layout.request_render(true);
        layout.on_active_mesh_changed();
        assert!(!layout.render_enabled());
        assert_eq!(layout.active_tab(), Tab::Mesh);

        let mut layout = LayoutController::default();
        layout.request_render(true);
        layout.set_active_tab(Tab::Design).unwrap();
        layout.on_active_mesh_changed();
        assert_eq!(layout.active_tab(), Tab::Design);
    }

    #[test]
    fn test_visible_viewports_per_mode() {
        let mut layout = LayoutController::default();
        assert_eq!(
            layout.visible_viewports(),
            vec![ViewportSlot::live(ViewportId::TabbedDesign)]
        );

        layout.set_mode(LayoutMode::Split);
        let ids: Vec<_> = layout.visible_viewports().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![ViewportId::SplitDesign, ViewportId::SplitMesh]);

        layout.set_mode(LayoutMode::Triple);
        let slots = layout.visible_viewports();
        assert_eq!(slots.len(), 3);
        assert!(slots[2].inert);

        layout.request_render(true);
        assert!(!layout.visible_viewports()[2].inert);
    }

    #[test]
    fn test_focus_only_in_tabs() {
        let mut layout = LayoutController::default();
        layout.focus(DocumentKind::Mesh);
        assert_eq!(layout.active_tab(), Tab::Mesh);

        layout.set_mode(LayoutMode::Split);
        layout.focus(DocumentKind::DesignReference);
        assert_eq!(layout.active_tab(), Tab::Mesh);
    }

    #[test]
    fn test_viewport_ids_belong_to_modes() {
        for id in ViewportId::ALL {
            let mut layout = LayoutController::new(id.mode());
            layout.request_render(true);
            for tab in [Tab::Design, Tab::Mesh, Tab::Render] {
                layout.set_active_tab(tab).unwrap();
                assert!(layout
                    .visible_viewports()
                    .iter()
                    .all(|slot| slot.id.mode() == id.mode()));
            }
        }
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Split".parse::<LayoutMode>().unwrap(), LayoutMode::Split);
        assert!("quad".parse::<LayoutMode>().is_err());
    }
}
