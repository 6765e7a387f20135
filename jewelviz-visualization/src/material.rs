//! Material presets for the mesh and rendered-material viewports
//!
//! Presets form a closed set: every [`PresetId`] maps to exactly one immutable
//! [`MaterialPreset`], and each viewport draws from its own versioned
//! [`MaterialCatalog`]. Looking up a label outside the catalog is recoverable;
//! callers fall back to the catalog default.

use jewelviz_core::{Error, Result};
use serde::Serialize;
use std::fmt;

/// An sRGB colour with 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Colour from a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub const WHITE: Rgb = Rgb::from_hex(0xffffff);

    /// Gamma-encoded channels in `[0, 1]`
    pub fn to_srgb(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| c as f32 / 255.0)
    }

    /// Linear-light channels in `[0, 1]`, as shaders expect them
    pub fn to_linear(self) -> [f32; 3] {
        self.to_srgb().map(|c| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Identifier of every known material preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PresetId {
    DarkGreen,
    DarkBlue,
    DarkPink,
    DarkOrange,
    DarkRed,
    Violet,
    Mustard,
    Gold22kt,
    RoseGold,
    WhiteGold,
    Platinum,
    Silver,
}

impl PresetId {
    /// The preset record for this identifier
    pub fn preset(self) -> &'static MaterialPreset {
        match self {
            PresetId::DarkGreen => &DARK_GREEN,
            PresetId::DarkBlue => &DARK_BLUE,
            PresetId::DarkPink => &DARK_PINK,
            PresetId::DarkOrange => &DARK_ORANGE,
            PresetId::DarkRed => &DARK_RED,
            PresetId::Violet => &VIOLET,
            PresetId::Mustard => &MUSTARD,
            PresetId::Gold22kt => &GOLD_22KT,
            PresetId::RoseGold => &ROSE_GOLD,
            PresetId::WhiteGold => &WHITE_GOLD,
            PresetId::Platinum => &PLATINUM,
            PresetId::Silver => &SILVER,
        }
    }

    pub fn label(self) -> &'static str {
        self.preset().label
    }
}

/// Immutable physically-based material description
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialPreset {
    pub id: PresetId,
    pub label: &'static str,
    pub base_color: Rgb,
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub env_map_intensity: f32,
    pub reflectivity: f32,
    pub transmission: f32,
    pub ior: f32,
    pub specular_color: Rgb,
    pub specular_intensity: f32,
    pub thickness: f32,
    pub normal_scale: [f32; 2],
}

const fn preview_finish(id: PresetId, label: &'static str, hex: u32) -> MaterialPreset {
    MaterialPreset {
        id,
        label,
        base_color: Rgb::from_hex(hex),
        metalness: 0.7,
        roughness: 0.2,
        clearcoat: 0.4,
        clearcoat_roughness: 0.2,
        env_map_intensity: 2.5,
        reflectivity: 0.8,
        transmission: 0.0,
        ior: 1.5,
        specular_color: Rgb::WHITE,
        specular_intensity: 1.0,
        thickness: 0.0,
        normal_scale: [1.0, 1.0],
    }
}

const fn render_metal(id: PresetId, label: &'static str, hex: u32) -> MaterialPreset {
    MaterialPreset {
        id,
        label,
        base_color: Rgb::from_hex(hex),
        metalness: 0.7,
        roughness: 0.2,
        clearcoat: 0.3,
        clearcoat_roughness: 0.2,
        env_map_intensity: 1.0,
        reflectivity: 0.7,
        transmission: 0.0,
        ior: 1.5,
        // Specular highlights are tinted with the metal itself
        specular_color: Rgb::from_hex(hex),
        specular_intensity: 0.8,
        thickness: 0.0,
        normal_scale: [0.1, 0.1],
    }
}

static DARK_GREEN: MaterialPreset = preview_finish(PresetId::DarkGreen, "Dark Green", 0x006400);
static DARK_BLUE: MaterialPreset = preview_finish(PresetId::DarkBlue, "Dark Blue", 0x00008B);
static DARK_PINK: MaterialPreset = preview_finish(PresetId::DarkPink, "Dark Pink", 0x8B1C62);
static DARK_ORANGE: MaterialPreset = preview_finish(PresetId::DarkOrange, "Dark Orange", 0x8B4500);
static DARK_RED: MaterialPreset = preview_finish(PresetId::DarkRed, "Dark Red", 0x8B0000);
static VIOLET: MaterialPreset = preview_finish(PresetId::Violet, "Violet", 0x8A2BE2);
static MUSTARD: MaterialPreset = preview_finish(PresetId::Mustard, "Mustard", 0xFFD700);

static GOLD_22KT: MaterialPreset = render_metal(PresetId::Gold22kt, "22kt Gold", 0xFFD700);
static ROSE_GOLD: MaterialPreset = render_metal(PresetId::RoseGold, "Rose Gold", 0xB76E79);
static WHITE_GOLD: MaterialPreset = render_metal(PresetId::WhiteGold, "White Gold", 0xF5F5F5);
static PLATINUM: MaterialPreset = render_metal(PresetId::Platinum, "Platinum", 0xE5E4E2);

static SILVER: MaterialPreset = MaterialPreset {
    id: PresetId::Silver,
    label: "Silver",
    base_color: Rgb::from_hex(0xC0C0C0),
    metalness: 1.0,
    roughness: 0.2,
    clearcoat: 0.0,
    clearcoat_roughness: 0.0,
    env_map_intensity: 2.0,
    reflectivity: 0.5,
    transmission: 0.0,
    ior: 1.5,
    specular_color: Rgb::WHITE,
    specular_intensity: 1.0,
    thickness: 0.0,
    normal_scale: [1.0, 1.0],
};

/// A closed, versioned list of presets offered by one viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialCatalog {
    pub name: &'static str,
    pub version: u32,
    entries: &'static [PresetId],
}

/// Finishes offered in the interactive mesh viewport
pub static PREVIEW_FINISHES: MaterialCatalog = MaterialCatalog {
    name: "preview-finishes",
    version: 1,
    entries: &[
        PresetId::DarkGreen,
        PresetId::DarkBlue,
        PresetId::DarkPink,
        PresetId::DarkOrange,
        PresetId::DarkRed,
        PresetId::Violet,
        PresetId::Mustard,
    ],
};

/// Metals offered in the rendered-material viewport
pub static RENDER_METALS: MaterialCatalog = MaterialCatalog {
    name: "render-metals",
    version: 1,
    entries: &[
        PresetId::Gold22kt,
        PresetId::RoseGold,
        PresetId::WhiteGold,
        PresetId::Platinum,
        PresetId::Silver,
    ],
};

impl MaterialCatalog {
    /// Preset used when nothing has been chosen
    pub fn default_preset(&self) -> &'static MaterialPreset {
        self.entries
            .first()
            .map_or(&DARK_GREEN, |id| id.preset())
    }

    /// Presets in display order
    pub fn presets(&self) -> impl Iterator<Item = &'static MaterialPreset> + '_ {
        self.entries.iter().map(|id| id.preset())
    }

    /// Labels in display order
    pub fn labels(&self) -> Vec<&'static str> {
        self.presets().map(|p| p.label).collect()
    }

    pub fn contains(&self, id: PresetId) -> bool {
        self.entries.contains(&id)
    }

    /// Look up a preset by its label (case-insensitive)
    pub fn select_preset(&self, label: &str) -> Result<&'static MaterialPreset> {
        let wanted = label.trim();
        self.presets()
            .find(|p| p.label.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownPreset(label.to_string()))
    }

    /// Look up a preset, falling back to the catalog default
    pub fn select_or_default(&self, label: &str) -> &'static MaterialPreset {
        match self.select_preset(label) {
            Ok(preset) => preset,
            Err(err) => {
                let fallback = self.default_preset();
                tracing::warn!(
                    catalog = self.name,
                    version = self.version,
                    fallback = fallback.label,
                    "{}",
                    err
                );
                fallback
            }
        }
    }
}
