//! Raster image probing
//!
//! Reads just enough of an encoded image to learn its format and pixel
//! dimensions; pixel data is never decoded.

use crate::{error::IoError, media::ImageFormat};
use jewelviz_core::Result;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Format and size of an encoded raster image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterInfo {
    pub format: Option<ImageFormat>,
    pub width: u32,
    pub height: u32,
}

impl RasterInfo {
    /// Displayed size at the given zoom factor, rounded to whole pixels
    pub fn scaled(&self, zoom: f32) -> (u32, u32) {
        (
            (self.width as f32 * zoom).round() as u32,
            (self.height as f32 * zoom).round() as u32,
        )
    }
}

/// Probe the format and dimensions of an encoded image
pub fn probe(bytes: &[u8]) -> Result<RasterInfo> {
    let reader = image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(IoError::Io)?;

    let format = reader.format().and_then(|f| match f {
        image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
        image::ImageFormat::Png => Some(ImageFormat::Png),
        image::ImageFormat::Gif => Some(ImageFormat::Gif),
        _ => None,
    });

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| IoError::UnreadableImage {
            message: e.to_string(),
        })?;

    tracing::debug!(width, height, ?format, "Probed raster image");
    Ok(RasterInfo {
        format,
        width,
        height,
    })
}
