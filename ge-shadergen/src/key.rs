//! Vertex shader variant key.
//!
//! The key is a 64-bit word with every pipeline field at a fixed bit offset.
//! The offsets are a format contract with whoever builds keys: moving a field
//! changes the meaning of every stored key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ShaderGenError;
use crate::ge_constants::{
    LightComputation, LightType, MaterialUpdate, TessellationMode, UvGenMode,
};

pub const VS_BIT_LMODE: u32 = 0;
pub const VS_BIT_IS_THROUGH: u32 = 1;
pub const VS_BIT_HAS_COLOR: u32 = 3;
pub const VS_BIT_USE_HW_TRANSFORM: u32 = 8;
pub const VS_BIT_HAS_NORMAL: u32 = 9;
pub const VS_BIT_NORM_REVERSE: u32 = 10;
pub const VS_BIT_HAS_TEXCOORD: u32 = 11;
pub const VS_BIT_HAS_COLOR_TESS: u32 = 12;
pub const VS_BIT_UVGEN_MODE: u32 = 16; // 2 bits
pub const VS_BIT_LS0: u32 = 18; // 2 bits
pub const VS_BIT_LS1: u32 = 20; // 2 bits
pub const VS_BIT_LIGHT0_COMP: u32 = 32; // 2 bits, +4 per light
pub const VS_BIT_LIGHT0_TYPE: u32 = 34; // 2 bits, +4 per light
pub const VS_BIT_MATERIAL_UPDATE: u32 = 48; // 3 bits
pub const VS_BIT_SPLINE: u32 = 51;
pub const VS_BIT_LIGHT0_ENABLE: u32 = 52; // +1 per light
pub const VS_BIT_LIGHTING_ENABLE: u32 = 56;
pub const VS_BIT_FLATSHADE: u32 = 62;
pub const VS_BIT_BEZIER: u32 = 63;

/// Number of hardware light slots
pub const NUM_LIGHTS: usize = 4;

/// One light slot: its enable bit plus type and computation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LightSlot {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(rename = "type")]
    pub light_type: LightType,
    pub computation: LightComputation,
}

fn enabled_by_default() -> bool {
    true
}

impl LightSlot {
    /// Disabled slot; type and computation bits stay clear
    pub const OFF: LightSlot = LightSlot {
        enabled: false,
        light_type: LightType::Directional,
        computation: LightComputation::DiffuseOnly,
    };

    /// Enabled slot
    pub const fn new(light_type: LightType, computation: LightComputation) -> Self {
        Self {
            enabled: true,
            light_type,
            computation,
        }
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Packed vertex shader variant key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VShaderId(u64);

impl VShaderId {
    /// Key with every flag clear, so every light slot is disabled
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn bit(self, bit: u32) -> bool {
        (self.0 >> bit) & 1 != 0
    }

    pub const fn bits(self, bit: u32, count: u32) -> u64 {
        (self.0 >> bit) & ((1u64 << count) - 1)
    }

    pub fn set_bit(&mut self, bit: u32, value: bool) {
        if value {
            self.0 |= 1u64 << bit;
        } else {
            self.0 &= !(1u64 << bit);
        }
    }

    pub fn set_bits(&mut self, bit: u32, count: u32, value: u64) {
        let mask = ((1u64 << count) - 1) << bit;
        self.0 = (self.0 & !mask) | ((value << bit) & mask);
    }

    // Decoded fields

    pub fn lmode(self) -> bool {
        self.bit(VS_BIT_LMODE)
    }

    pub fn is_through(self) -> bool {
        self.bit(VS_BIT_IS_THROUGH)
    }

    pub fn has_color(self) -> bool {
        self.bit(VS_BIT_HAS_COLOR)
    }

    pub fn use_hw_transform(self) -> bool {
        self.bit(VS_BIT_USE_HW_TRANSFORM)
    }

    pub fn has_normal(self) -> bool {
        self.bit(VS_BIT_HAS_NORMAL)
    }

    pub fn normals_reversed(self) -> bool {
        self.bit(VS_BIT_NORM_REVERSE)
    }

    pub fn has_texcoord(self) -> bool {
        self.bit(VS_BIT_HAS_TEXCOORD)
    }

    pub fn has_color_tess(self) -> bool {
        self.bit(VS_BIT_HAS_COLOR_TESS)
    }

    pub fn uv_gen_mode(self) -> UvGenMode {
        UvGenMode::from_bits(self.bits(VS_BIT_UVGEN_MODE, 2))
    }

    /// Light slots feeding shade-mapping UV generation
    pub fn shade_light_sources(self) -> (usize, usize) {
        (
            self.bits(VS_BIT_LS0, 2) as usize,
            self.bits(VS_BIT_LS1, 2) as usize,
        )
    }

    pub fn material_update(self) -> MaterialUpdate {
        MaterialUpdate::from_bits(self.bits(VS_BIT_MATERIAL_UPDATE, 3) as u8)
    }

    pub fn lighting_enabled(self) -> bool {
        self.bit(VS_BIT_LIGHTING_ENABLE)
    }

    pub fn flat_shade(self) -> bool {
        self.bit(VS_BIT_FLATSHADE)
    }

    pub fn tessellation(self) -> TessellationMode {
        if self.bit(VS_BIT_BEZIER) {
            TessellationMode::Bezier
        } else if self.bit(VS_BIT_SPLINE) {
            TessellationMode::Spline
        } else {
            TessellationMode::None
        }
    }

    /// # Panics
    ///
    /// Panics if `index >= NUM_LIGHTS`.
    pub fn light(self, index: usize) -> LightSlot {
        assert!(index < NUM_LIGHTS, "light index {} out of range", index);
        let offset = 4 * index as u32;
        LightSlot {
            enabled: self.bit(VS_BIT_LIGHT0_ENABLE + index as u32),
            light_type: LightType::from_bits(self.bits(VS_BIT_LIGHT0_TYPE + offset, 2)),
            computation: LightComputation::from_bits(self.bits(VS_BIT_LIGHT0_COMP + offset, 2)),
        }
    }

    pub fn lights(self) -> [LightSlot; NUM_LIGHTS] {
        std::array::from_fn(|i| self.light(i))
    }

    // Builder-style setters

    pub fn with_lmode(mut self, on: bool) -> Self {
        self.set_bit(VS_BIT_LMODE, on);
        self
    }

    pub fn with_through(mut self, on: bool) -> Self {
        self.set_bit(VS_BIT_IS_THROUGH, on);
        self
    }

    pub fn with_color(mut self, on: bool) -> Self {
        self.set_bit(VS_BIT_HAS_COLOR, on);
        self
    }

    pub fn with_hw_transform(mut self, on: bool) -> Self {
        self.set_bit(VS_BIT_USE_HW_TRANSFORM, on);
        self
    }

    pub fn with_normal(mut self, on: bool) -> Self {
        self.set_bit(VS_BIT_HAS_NORMAL, on);
        self
    }

    pub fn with_reversed_normals(mut self, on: bool) -> Self {
        self.set_bit(VS_BIT_NORM_REVERSE, on);
        self
    }

    pub fn with_texcoord(mut self, on: bool) -> Self {
        self.set_bit(VS_BIT_HAS_TEXCOORD, on);
        self
    }

    pub fn with_color_tess(mut self, on: bool) -> Self {
        self.set_bit(VS_BIT_HAS_COLOR_TESS, on);
        self
    }

    pub fn with_uv_gen_mode(mut self, mode: UvGenMode) -> Self {
        self.set_bits(VS_BIT_UVGEN_MODE, 2, mode.bits());
        self
    }

    pub fn with_shade_light_sources(mut self, ls0: usize, ls1: usize) -> Self {
        self.set_bits(VS_BIT_LS0, 2, ls0 as u64);
        self.set_bits(VS_BIT_LS1, 2, ls1 as u64);
        self
    }

    pub fn with_material_update(mut self, update: MaterialUpdate) -> Self {
        self.set_bits(VS_BIT_MATERIAL_UPDATE, 3, update.bits() as u64);
        self
    }

    pub fn with_lighting(mut self, on: bool) -> Self {
        self.set_bit(VS_BIT_LIGHTING_ENABLE, on);
        self
    }

    pub fn with_flat_shade(mut self, on: bool) -> Self {
        self.set_bit(VS_BIT_FLATSHADE, on);
        self
    }

    pub fn with_tessellation(mut self, mode: TessellationMode) -> Self {
        self.set_bit(VS_BIT_BEZIER, mode == TessellationMode::Bezier);
        self.set_bit(VS_BIT_SPLINE, mode == TessellationMode::Spline);
        self
    }

    /// # Panics
    ///
    /// Panics if `index >= NUM_LIGHTS`.
    pub fn with_light(mut self, index: usize, slot: LightSlot) -> Self {
        assert!(index < NUM_LIGHTS, "light index {} out of range", index);
        let offset = 4 * index as u32;
        let (computation, light_type) = if slot.enabled {
            (slot.computation.bits(), slot.light_type.bits())
        } else {
            (0, 0)
        };
        self.set_bit(VS_BIT_LIGHT0_ENABLE + index as u32, slot.enabled);
        self.set_bits(VS_BIT_LIGHT0_COMP + offset, 2, computation);
        self.set_bits(VS_BIT_LIGHT0_TYPE + offset, 2, light_type);
        self
    }
}

impl fmt::Display for VShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn flag(f: &mut fmt::Formatter<'_>, on: bool, name: &str) -> fmt::Result {
            if on { write!(f, " {}", name) } else { Ok(()) }
        }

        write!(f, "{:08x}:{:08x}", (self.0 >> 32) as u32, self.0 as u32)?;
        flag(f, self.is_through(), "THR")?;
        flag(f, self.use_hw_transform(), "HWX")?;
        flag(f, self.has_color(), "C")?;
        flag(f, self.has_texcoord(), "T")?;
        flag(f, self.has_normal(), "N")?;
        flag(f, self.lmode(), "LM")?;
        flag(f, self.normals_reversed(), "RevN")?;
        match self.uv_gen_mode() {
            UvGenMode::TextureCoords => {}
            UvGenMode::TextureMatrix => write!(f, " UVMtx")?,
            UvGenMode::EnvironmentMap => {
                let (ls0, ls1) = self.shade_light_sources();
                write!(f, " UVEnv:{}{}", ls0, ls1)?;
            }
            UvGenMode::Unknown => write!(f, " UVUnk")?,
        }
        if self.lighting_enabled() {
            write!(f, " Light:")?;
        }
        let shade_sources = (self.uv_gen_mode() == UvGenMode::EnvironmentMap).then(|| self.shade_light_sources());
        for (i, slot) in self.lights().iter().enumerate() {
            let lit = slot.is_enabled() && self.lighting_enabled();
            let shade = shade_sources.is_some_and(|(ls0, ls1)| i == ls0 || i == ls1);
            if lit || shade {
                write!(
                    f,
                    " {}: c:{} t:{}",
                    i,
                    slot.computation.bits(),
                    slot.light_type.bits()
                )?;
            }
        }
        let mat_update = self.material_update().bits();
        if mat_update != 0 {
            write!(f, " MatUp:{}", mat_update)?;
        }
        flag(f, self.flat_shade(), "Flat")?;
        match self.tessellation() {
            TessellationMode::None => {}
            TessellationMode::Bezier => write!(f, " Bezier")?,
            TessellationMode::Spline => write!(f, " Spline")?,
        }
        flag(f, self.has_color_tess(), "TessC")
    }
}

impl FromStr for VShaderId {
    type Err = ShaderGenError;

    /// Accepts `0x`-prefixed hex or the `hi:lo` form printed by `Display`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ShaderGenError::InvalidKey(s.to_string());
        let text = s.trim();
        let head = text.split_whitespace().next().ok_or_else(invalid)?;
        let raw = if let Some((hi, lo)) = head.split_once(':') {
            let hi = u32::from_str_radix(hi, 16).map_err(|_| invalid())?;
            let lo = u32::from_str_radix(lo, 16).map_err(|_| invalid())?;
            ((hi as u64) << 32) | lo as u64
        } else {
            let hex = head
                .strip_prefix("0x")
                .or_else(|| head.strip_prefix("0X"))
                .ok_or_else(invalid)?;
            u64::from_str_radix(hex, 16).map_err(|_| invalid())?
        };
        Ok(Self(raw))
    }
}

/// Human-readable key description, used by TOML key files
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexKeyConfig {
    pub through: bool,
    pub hardware_transform: bool,
    pub has_color: bool,
    pub has_normal: bool,
    pub has_texcoord: bool,
    pub reverse_normals: bool,
    pub secondary_color: bool,
    pub flat_shade: bool,
    pub lighting: bool,
    pub material_update: MaterialUpdate,
    pub tessellation: TessellationMode,
    pub tess_has_color: bool,
    pub uv_gen: UvGenMode,
    pub shade_lights: [usize; 2],
    pub lights: Vec<LightSlot>,
}

impl VertexKeyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ShaderGenError> {
        toml::from_str(text).map_err(|e| ShaderGenError::InvalidKeyConfig(e.to_string()))
    }

    /// Pack into a key, checking the fields fit their bit widths
    pub fn to_key(&self) -> Result<VShaderId, ShaderGenError> {
        if self.lights.len() > NUM_LIGHTS {
            return Err(ShaderGenError::InvalidKeyConfig(format!(
                "{} lights configured, hardware has {}",
                self.lights.len(),
                NUM_LIGHTS
            )));
        }
        if let Some(&ls) = self.shade_lights.iter().find(|&&ls| ls >= NUM_LIGHTS) {
            return Err(ShaderGenError::InvalidKeyConfig(format!(
                "shade-mapping light {} out of range",
                ls
            )));
        }
        if self.through && self.hardware_transform {
            return Err(ShaderGenError::InvalidKeyConfig(
                "through mode and hardware transform are mutually exclusive".to_string(),
            ));
        }

        let mut id = VShaderId::new()
            .with_through(self.through)
            .with_hw_transform(self.hardware_transform)
            .with_color(self.has_color)
            .with_normal(self.has_normal)
            .with_texcoord(self.has_texcoord)
            .with_reversed_normals(self.reverse_normals)
            .with_lmode(self.secondary_color)
            .with_flat_shade(self.flat_shade)
            .with_lighting(self.lighting)
            .with_material_update(self.material_update)
            .with_tessellation(self.tessellation)
            .with_color_tess(self.tess_has_color)
            .with_uv_gen_mode(self.uv_gen);
        if self.uv_gen == UvGenMode::EnvironmentMap {
            id = id.with_shade_light_sources(self.shade_lights[0], self.shade_lights[1]);
        }
        for (i, slot) in self.lights.iter().enumerate() {
            id = id.with_light(i, *slot);
        }
        Ok(id)
    }
}
