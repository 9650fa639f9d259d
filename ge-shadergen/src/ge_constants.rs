//! GE hardware enumerations referenced by the variant key and the generators.
//!
//! Numeric values match the hardware register encodings, so `from_bits` is a
//! plain table lookup over the 2-bit (or 3-bit) field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ShaderGenError;

/// Light source kind, as stored in the light type register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightType {
    Directional = 0,
    Point = 1,
    Spot = 2,
    /// Behaves like a spot light on hardware
    Unknown = 3,
}

impl LightType {
    pub const fn from_bits(bits: u64) -> Self {
        match bits & 0x3 {
            0 => LightType::Directional,
            1 => LightType::Point,
            2 => LightType::Spot,
            _ => LightType::Unknown,
        }
    }

    pub const fn bits(self) -> u64 {
        self as u64
    }

    /// Spot and the undocumented fourth type both use the cone test
    pub const fn is_spot_like(self) -> bool {
        matches!(self, LightType::Spot | LightType::Unknown)
    }
}

/// Per-light computation mode, the raw 2-bit hardware field.
///
/// Value 3 is unused by hardware and lights like diffuse only. Whether a slot
/// is lit at all is a separate enable bit in the variant key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightComputation {
    #[default]
    DiffuseOnly = 0,
    DiffuseAndSpecular = 1,
    PoweredDiffuseOnly = 2,
    Unused = 3,
}

impl LightComputation {
    pub const fn from_bits(bits: u64) -> Self {
        match bits & 0x3 {
            0 => LightComputation::DiffuseOnly,
            1 => LightComputation::DiffuseAndSpecular,
            2 => LightComputation::PoweredDiffuseOnly,
            _ => LightComputation::Unused,
        }
    }

    pub const fn bits(self) -> u64 {
        self as u64
    }
}

/// Texture coordinate generation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UvGenMode {
    #[default]
    TextureCoords = 0,
    TextureMatrix = 1,
    /// Shade mapping: UVs come from two light directions
    EnvironmentMap = 2,
    Unknown = 3,
}

impl UvGenMode {
    pub const fn from_bits(bits: u64) -> Self {
        match bits & 0x3 {
            0 => UvGenMode::TextureCoords,
            1 => UvGenMode::TextureMatrix,
            2 => UvGenMode::EnvironmentMap,
            _ => UvGenMode::Unknown,
        }
    }

    pub const fn bits(self) -> u64 {
        self as u64
    }
}

/// Hardware patch tessellation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TessellationMode {
    #[default]
    None,
    Bezier,
    Spline,
}

// Material update flags (which material colors follow the vertex color)
pub const MATERIAL_UPDATE_AMBIENT: u8 = 1;
pub const MATERIAL_UPDATE_DIFFUSE: u8 = 2;
pub const MATERIAL_UPDATE_SPECULAR: u8 = 4;

/// Decoded 3-bit material update mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MaterialUpdate {
    #[serde(default)]
    pub ambient: bool,
    #[serde(default)]
    pub diffuse: bool,
    #[serde(default)]
    pub specular: bool,
}

impl MaterialUpdate {
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            ambient: bits & MATERIAL_UPDATE_AMBIENT != 0,
            diffuse: bits & MATERIAL_UPDATE_DIFFUSE != 0,
            specular: bits & MATERIAL_UPDATE_SPECULAR != 0,
        }
    }

    pub const fn bits(self) -> u8 {
        (self.ambient as u8) * MATERIAL_UPDATE_AMBIENT
            | (self.diffuse as u8) * MATERIAL_UPDATE_DIFFUSE
            | (self.specular as u8) * MATERIAL_UPDATE_SPECULAR
    }
}

/// One color channel of a packed pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    /// Swizzle letter (`r`, `g`, `b` or `a`)
    pub name: char,
    pub bits: u32,
    pub shift: u32,
}

impl ChannelLayout {
    const fn new(name: char, bits: u32, shift: u32) -> Self {
        Self { name, bits, shift }
    }

    pub const fn mask(&self) -> u32 {
        (1 << self.bits) - 1
    }
}

const LAYOUT_565: [ChannelLayout; 3] = [
    ChannelLayout::new('r', 5, 0),
    ChannelLayout::new('g', 6, 5),
    ChannelLayout::new('b', 5, 11),
];
const LAYOUT_5551: [ChannelLayout; 4] = [
    ChannelLayout::new('r', 5, 0),
    ChannelLayout::new('g', 5, 5),
    ChannelLayout::new('b', 5, 10),
    ChannelLayout::new('a', 1, 15),
];
const LAYOUT_4444: [ChannelLayout; 4] = [
    ChannelLayout::new('r', 4, 0),
    ChannelLayout::new('g', 4, 4),
    ChannelLayout::new('b', 4, 8),
    ChannelLayout::new('a', 4, 12),
];
const LAYOUT_8888: [ChannelLayout; 4] = [
    ChannelLayout::new('r', 8, 0),
    ChannelLayout::new('g', 8, 8),
    ChannelLayout::new('b', 8, 16),
    ChannelLayout::new('a', 8, 24),
];

/// Framebuffer pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    #[serde(rename = "565")]
    Rgb565 = 0,
    #[serde(rename = "5551")]
    Rgba5551 = 1,
    #[serde(rename = "4444")]
    Rgba4444 = 2,
    #[serde(rename = "8888")]
    Rgba8888 = 3,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 4] = [
        PixelFormat::Rgb565,
        PixelFormat::Rgba5551,
        PixelFormat::Rgba4444,
        PixelFormat::Rgba8888,
    ];

    /// The formats a reinterpret can start or end at
    pub const PACKED_16BIT: [PixelFormat; 3] = [
        PixelFormat::Rgb565,
        PixelFormat::Rgba5551,
        PixelFormat::Rgba4444,
    ];

    pub const fn is_16bit(self) -> bool {
        !matches!(self, PixelFormat::Rgba8888)
    }

    /// Channel layout, lowest bits first
    pub const fn channels(self) -> &'static [ChannelLayout] {
        match self {
            PixelFormat::Rgb565 => &LAYOUT_565,
            PixelFormat::Rgba5551 => &LAYOUT_5551,
            PixelFormat::Rgba4444 => &LAYOUT_4444,
            PixelFormat::Rgba8888 => &LAYOUT_8888,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PixelFormat::Rgb565 => "565",
            PixelFormat::Rgba5551 => "5551",
            PixelFormat::Rgba4444 => "4444",
            PixelFormat::Rgba8888 => "8888",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = ShaderGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let digits = trimmed
            .strip_prefix("rgba")
            .or_else(|| trimmed.strip_prefix("rgb"))
            .unwrap_or(trimmed.as_str());
        PixelFormat::ALL
            .into_iter()
            .find(|fmt| fmt.name() == digits)
            .ok_or_else(|| ShaderGenError::UnknownName {
                kind: "pixel format",
                value: s.to_string(),
            })
    }
}
