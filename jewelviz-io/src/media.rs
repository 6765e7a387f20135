//! Media type detection for uploaded documents
//!
//! Detection trusts the type declared by the host first and falls back to the
//! file extension. Content is not sniffed here; the mesh parser performs its
//! own validation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raster image encodings with a preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

/// Detected media type of a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum MediaType {
    Image(ImageFormat),
    Pdf,
    WordDocument,
    Spreadsheet,
    Stl,
    Other(String),
}

/// How a media type is presented in a 2D document viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewClass {
    /// Zoomable raster image
    Image,
    /// Paged document with page navigation
    Paged,
    /// No preview, a placeholder names the file
    Unsupported,
}

impl MediaType {
    /// Detect the media type from a declared MIME type and the file name
    pub fn detect(name: &str, declared: Option<&str>) -> Self {
        if let Some(media) = declared.and_then(Self::from_mime) {
            return media;
        }

        match extension(name).as_deref() {
            Some("jpg") | Some("jpeg") => MediaType::Image(ImageFormat::Jpeg),
            Some("png") => MediaType::Image(ImageFormat::Png),
            Some("gif") => MediaType::Image(ImageFormat::Gif),
            Some("pdf") => MediaType::Pdf,
            Some("doc") | Some("docx") => MediaType::WordDocument,
            Some("xls") | Some("xlsx") => MediaType::Spreadsheet,
            Some("stl") => MediaType::Stl,
            _ => MediaType::Other(declared.unwrap_or("application/octet-stream").to_string()),
        }
    }

    /// Map a MIME type onto a known media type
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        let media = match mime.as_str() {
            "image/jpeg" | "image/jpg" => MediaType::Image(ImageFormat::Jpeg),
            "image/png" => MediaType::Image(ImageFormat::Png),
            "image/gif" => MediaType::Image(ImageFormat::Gif),
            "application/pdf" => MediaType::Pdf,
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                MediaType::WordDocument
            }
            "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                MediaType::Spreadsheet
            }
            "model/stl" | "model/x.stl-binary" | "application/sla" => MediaType::Stl,
            _ => return None,
        };
        Some(media)
    }

    /// Canonical MIME type for uploads
    pub fn mime(&self) -> &str {
        match self {
            MediaType::Image(ImageFormat::Jpeg) => "image/jpeg",
            MediaType::Image(ImageFormat::Png) => "image/png",
            MediaType::Image(ImageFormat::Gif) => "image/gif",
            MediaType::Pdf => "application/pdf",
            MediaType::WordDocument => "application/msword",
            MediaType::Spreadsheet => "application/vnd.ms-excel",
            MediaType::Stl => "model/stl",
            MediaType::Other(mime) => mime,
        }
    }

    /// Whether the type may be uploaded as a design reference
    pub fn is_design_reference(&self) -> bool {
        matches!(
            self,
            MediaType::Image(_) | MediaType::Pdf | MediaType::WordDocument | MediaType::Spreadsheet
        )
    }

    /// Which 2D viewer presents this type
    pub fn preview_class(&self) -> PreviewClass {
        match self {
            MediaType::Image(_) => PreviewClass::Image,
            MediaType::Pdf => PreviewClass::Paged,
            _ => PreviewClass::Unsupported,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Lowercased extension of a file name, without the dot
pub fn extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Whether a file name carries the given extension (case-insensitive)
pub fn has_extension(name: &str, ext: &str) -> bool {
    extension(name).is_some_and(|e| e == ext.trim_start_matches('.').to_ascii_lowercase())
}
