//! View state for 2D document viewports
//!
//! Images are zoomable, PDFs add page navigation, and every other media type
//! gets a placeholder naming the file. Placeholders are a normal outcome, not
//! an error.

use jewelviz_io::{MediaType, PreviewClass, RasterInfo};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message shown in place of documents without a viewer
pub const PLACEHOLDER_MESSAGE: &str = "Preview not available for this file type";

/// Zoom factor stored in tenths so repeated steps never drift
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    pub const MIN: ZoomLevel = ZoomLevel(5);
    pub const MAX: ZoomLevel = ZoomLevel(50);
    pub const DEFAULT: ZoomLevel = ZoomLevel(10);

    /// Nearest level to `factor`, clamped to `[0.5, 5.0]`
    pub fn from_factor(factor: f32) -> Self {
        if !factor.is_finite() {
            return Self::DEFAULT;
        }
        let tenths = (factor * 10.0).round().clamp(Self::MIN.0 as f32, Self::MAX.0 as f32);
        ZoomLevel(tenths as u8)
    }

    pub fn factor(self) -> f32 {
        self.0 as f32 / 10.0
    }

    /// One step (0.1) larger, saturating at the maximum
    pub fn step_in(self) -> Self {
        ZoomLevel((self.0 + 1).min(Self::MAX.0))
    }

    /// One step (0.1) smaller, saturating at the minimum
    pub fn step_out(self) -> Self {
        ZoomLevel(self.0.saturating_sub(1).max(Self::MIN.0))
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0 as u32 * 10)
    }
}

/// Page count of a paged document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageCount {
    /// Still being resolved
    Unknown,
    Known(u32),
    /// Resolution failed; navigation is limited to the first page
    Failed,
}

impl PageCount {
    /// Number of pages navigation may reach
    pub fn navigable(self) -> u32 {
        match self {
            PageCount::Known(n) => n.max(1),
            PageCount::Unknown | PageCount::Failed => 1,
        }
    }
}

impl fmt::Display for PageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageCount::Known(n) => write!(f, "{}", n),
            PageCount::Unknown | PageCount::Failed => f.write_str("--"),
        }
    }
}

/// Presentation state of one 2D viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DocumentView {
    Image {
        zoom: ZoomLevel,
        dimensions: Option<RasterInfo>,
    },
    Paged {
        page: u32,
        page_count: PageCount,
        zoom: ZoomLevel,
    },
    Placeholder {
        name: String,
    },
}

impl DocumentView {
    /// Initial view for a document of the given media type
    pub fn for_media(name: &str, media: &MediaType) -> Self {
        match media.preview_class() {
            PreviewClass::Image => DocumentView::Image {
                zoom: ZoomLevel::DEFAULT,
                dimensions: None,
            },
            PreviewClass::Paged => DocumentView::Paged {
                page: 1,
                page_count: PageCount::Unknown,
                zoom: ZoomLevel::DEFAULT,
            },
            PreviewClass::Unsupported => DocumentView::Placeholder {
                name: name.to_string(),
            },
        }
    }

    pub fn zoom(&self) -> Option<ZoomLevel> {
        match self {
            DocumentView::Image { zoom, .. } | DocumentView::Paged { zoom, .. } => Some(*zoom),
            DocumentView::Placeholder { .. } => None,
        }
    }

    fn zoom_mut(&mut self) -> Option<&mut ZoomLevel> {
        match self {
            DocumentView::Image { zoom, .. } | DocumentView::Paged { zoom, .. } => Some(zoom),
            DocumentView::Placeholder { .. } => None,
        }
    }

    pub fn zoom_in(&mut self) {
        if let Some(zoom) = self.zoom_mut() {
            *zoom = zoom.step_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(zoom) = self.zoom_mut() {
            *zoom = zoom.step_out();
        }
    }

    pub fn set_zoom(&mut self, factor: f32) {
        if let Some(zoom) = self.zoom_mut() {
            *zoom = ZoomLevel::from_factor(factor);
        }
    }

    /// Current page, for paged documents
    pub fn page(&self) -> Option<u32> {
        match self {
            DocumentView::Paged { page, .. } => Some(*page),
            _ => None,
        }
    }

    pub fn page_count(&self) -> Option<PageCount> {
        match self {
            DocumentView::Paged { page_count, .. } => Some(*page_count),
            _ => None,
        }
    }

    /// Jump to a page, clamped to `[1, total]`
    pub fn go_to_page(&mut self, target: u32) {
        if let DocumentView::Paged {
            page, page_count, ..
        } = self
        {
            *page = target.clamp(1, page_count.navigable());
        }
    }

    pub fn next_page(&mut self) {
        if let Some(page) = self.page() {
            self.go_to_page(page.saturating_add(1));
        }
    }

    pub fn previous_page(&mut self) {
        if let Some(page) = self.page() {
            self.go_to_page(page.saturating_sub(1));
        }
    }

    /// Record the outcome of page count resolution
    pub fn resolve_pages(&mut self, outcome: Option<u32>) {
        if let DocumentView::Paged {
            page, page_count, ..
        } = self
        {
            *page_count = match outcome {
                Some(n) if n > 0 => PageCount::Known(n),
                _ => PageCount::Failed,
            };
            *page = (*page).clamp(1, page_count.navigable());
        }
    }

    /// Record probed raster dimensions
    pub fn set_dimensions(&mut self, info: RasterInfo) {
        if let DocumentView::Image { dimensions, .. } = self {
            *dimensions = Some(info);
        }
    }

    /// Size in pixels the image occupies at the current zoom
    pub fn displayed_size(&self) -> Option<(u32, u32)> {
        match self {
            DocumentView::Image {
                zoom,
                dimensions: Some(info),
            } => Some(info.scaled(zoom.factor())),
            _ => None,
        }
    }

    /// Page indicator text, e.g. `Page 2 of 5` or `Page 1 of --`
    pub fn page_label(&self) -> Option<String> {
        match self {
            DocumentView::Paged {
                page, page_count, ..
            } => Some(format!("Page {} of {}", page, page_count)),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, DocumentView::Placeholder { .. })
    }
}
