//! Viewer configuration
//!
//! Loaded from JSON with every field optional, then adjusted from environment
//! variables.

use crate::layout::LayoutMode;
use jewelviz_core::{CanonicalFrame, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`ViewerConfig::max_file_size_mb`]
pub const ENV_MAX_FILE_SIZE_MB: &str = "JEWELVIZ_MAX_FILE_SIZE_MB";
/// Environment variable overriding [`ViewerConfig::default_layout`]
pub const ENV_DEFAULT_LAYOUT: &str = "JEWELVIZ_DEFAULT_LAYOUT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Maximum accepted upload size in MB
    pub max_file_size_mb: u64,
    /// Reserved extension of mesh files, without the dot
    pub mesh_extension: String,
    /// Largest dimension of meshes in the preview pane
    pub preview_canonical_size: f32,
    /// Largest dimension of meshes in the rendered-material pane
    pub render_canonical_size: f32,
    pub default_layout: LayoutMode,
    /// Owner recorded on published file sets when no user is signed in
    pub owner_email: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            mesh_extension: "stl".to_string(),
            preview_canonical_size: CanonicalFrame::Preview.default_size(),
            render_canonical_size: CanonicalFrame::Showcase.default_size(),
            default_layout: LayoutMode::Tabs,
            owner_email: None,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup. Unparseable values
    /// are ignored with a warning.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_FILE_SIZE_MB) {
            match raw.trim().parse() {
                Ok(mb) => self.max_file_size_mb = mb,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid {}", ENV_MAX_FILE_SIZE_MB),
            }
        }
        if let Some(raw) = lookup(ENV_DEFAULT_LAYOUT) {
            match raw.parse() {
                Ok(mode) => self.default_layout = mode,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid {}", ENV_DEFAULT_LAYOUT),
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_file_size_mb == 0 {
            return Err(Error::Config("max_file_size_mb must be positive".to_string()));
        }
        if self.mesh_extension.trim_start_matches('.').is_empty() {
            return Err(Error::Config("mesh_extension must not be empty".to_string()));
        }
        for (name, size) in [
            ("preview_canonical_size", self.preview_canonical_size),
            ("render_canonical_size", self.render_canonical_size),
        ] {
            if !(size.is_finite() && size > 0.0) {
                return Err(Error::Config(format!("{} must be positive, got {}", name, size)));
            }
        }
        Ok(())
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Canonical size configured for a frame
    pub fn canonical_size(&self, frame: CanonicalFrame) -> f32 {
        match frame {
            CanonicalFrame::Preview => self.preview_canonical_size,
            CanonicalFrame::Showcase => self.render_canonical_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.max_file_size_mb, 50);
        assert_eq!(config.mesh_extension, "stl");
        assert_eq!(config.canonical_size(CanonicalFrame::Preview), 50.0);
        assert_eq!(config.canonical_size(CanonicalFrame::Showcase), 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = ViewerConfig::from_json_str(r#"{"max_file_size_mb": 10, "default_layout": "triple"}"#)
            .unwrap();
        assert_eq!(config.max_file_size_mb, 10);
        assert_eq!(config.default_layout, LayoutMode::Triple);
        assert_eq!(config.mesh_extension, "stl");
        assert_eq!(config.max_file_size_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ViewerConfig::from_json_str("{ nope"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = ViewerConfig::default().with_overrides_from(|key| match key {
            ENV_MAX_FILE_SIZE_MB => Some("75".to_string()),
            ENV_DEFAULT_LAYOUT => Some("split".to_string()),
            _ => None,
        });
        assert_eq!(config.max_file_size_mb, 75);
        assert_eq!(config.default_layout, LayoutMode::Split);
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let config = ViewerConfig::default().with_overrides_from(|_| Some("lots".to_string()));
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ViewerConfig::default();
        config.render_canonical_size = 0.0;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.mesh_extension = ".".to_string();
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.max_file_size_mb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_path() {
        let temp_file = "test_viewer_config.json";
        std::fs::write(temp_file, r#"{"owner_email": "studio@example.com"}"#).unwrap();
        let config = ViewerConfig::from_path(temp_file).unwrap();
        assert_eq!(config.owner_email.as_deref(), Some("studio@example.com"));
        let _ = std::fs::remove_file(temp_file);
    }
}
