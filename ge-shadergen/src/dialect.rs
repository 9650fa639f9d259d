//! Target shading dialect description.
//!
//! A `DialectDescriptor` is chosen once when the graphics backend is picked and
//! is read-only afterwards. Generators only ever borrow it.
//!
//! Dialects can also be described in TOML:
//!
//! ```toml
//! shading_language = "embedded-glsl"
//! glsl_version_number = 300
//! is_embedded_profile = true
//! supports_es30_syntax = true
//! has_bitwise_integer_ops = true
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ShaderGenError;

/// Shading language family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShaderLanguage {
    DesktopGlsl,
    EmbeddedGlsl,
    GlslVulkan,
    /// Legacy Direct3D (shader model 3)
    HlslD3d9,
    /// Modern Direct3D (shader model 4+)
    HlslD3d11,
}

impl ShaderLanguage {
    pub const ALL: [ShaderLanguage; 5] = [
        ShaderLanguage::DesktopGlsl,
        ShaderLanguage::EmbeddedGlsl,
        ShaderLanguage::GlslVulkan,
        ShaderLanguage::HlslD3d9,
        ShaderLanguage::HlslD3d11,
    ];

    pub const fn is_hlsl(self) -> bool {
        matches!(self, ShaderLanguage::HlslD3d9 | ShaderLanguage::HlslD3d11)
    }

    pub const fn is_glsl(self) -> bool {
        !self.is_hlsl()
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShaderLanguage::DesktopGlsl => "desktop-glsl",
            ShaderLanguage::EmbeddedGlsl => "embedded-glsl",
            ShaderLanguage::GlslVulkan => "glsl-vulkan",
            ShaderLanguage::HlslD3d9 => "hlsl-d3d9",
            ShaderLanguage::HlslD3d11 => "hlsl-d3d11",
        }
    }
}

impl fmt::Display for ShaderLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShaderLanguage {
    type Err = ShaderGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ShaderLanguage::ALL
            .into_iter()
            .find(|lang| lang.name() == wanted)
            .ok_or_else(|| ShaderGenError::UnknownName {
                kind: "shader language",
                value: s.to_string(),
            })
    }
}

/// Capabilities and version of the target shading dialect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectDescriptor {
    pub shading_language: ShaderLanguage,
    /// Only meaningful for the GLSL languages
    #[serde(default)]
    pub glsl_version_number: u32,
    /// Mobile profile: has precision qualifiers
    #[serde(default)]
    pub is_embedded_profile: bool,
    /// `in`/`out`/`texture()` syntax rather than `attribute`/`varying`/`texture2D()`
    #[serde(default)]
    pub supports_es30_syntax: bool,
    /// Gates color format reinterpretation
    #[serde(default)]
    pub has_bitwise_integer_ops: bool,
    /// Printed as a comment in GLSL preambles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_info: Option<String>,
}

impl DialectDescriptor {
    /// Default descriptor for a language
    pub fn preset(language: ShaderLanguage) -> Self {
        let (glsl_version_number, is_embedded_profile, has_bitwise_integer_ops) = match language {
            ShaderLanguage::DesktopGlsl => (330, false, true),
            ShaderLanguage::EmbeddedGlsl => (300, true, true),
            ShaderLanguage::GlslVulkan => (450, false, true),
            ShaderLanguage::HlslD3d9 => (0, false, false),
            ShaderLanguage::HlslD3d11 => (0, false, true),
        };
        Self {
            shading_language: language,
            glsl_version_number,
            is_embedded_profile,
            supports_es30_syntax: true,
            has_bitwise_integer_ops,
            driver_info: None,
        }
    }

    /// GLSL ES 1.00: no integer bit ops, `attribute`/`varying` syntax
    pub fn gles2() -> Self {
        Self {
            shading_language: ShaderLanguage::EmbeddedGlsl,
            glsl_version_number: 100,
            is_embedded_profile: true,
            supports_es30_syntax: false,
            has_bitwise_integer_ops: false,
            driver_info: None,
        }
    }

    /// Parse a dialect description from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ShaderGenError> {
        toml::from_str(text).map_err(|e| ShaderGenError::InvalidDialectConfig(e.to_string()))
    }

    /// Load a dialect description from a TOML file
    pub fn load(path: &Path) -> Result<Self, ShaderGenError> {
        let text = std::fs::read_to_string(path).map_err(|e| ShaderGenError::ConfigIo {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let dialect = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded dialect {} from {}", dialect, path.display());
        Ok(dialect)
    }

    pub fn with_driver_info(mut self, info: impl Into<String>) -> Self {
        self.driver_info = Some(info.into());
        self
    }

    pub fn language(&self) -> ShaderLanguage {
        self.shading_language
    }

    /// Light uniforms are arrays (indexed) instead of numbered scalars
    pub fn uses_uniform_indexing(&self) -> bool {
        matches!(
            self.shading_language,
            ShaderLanguage::GlslVulkan | ShaderLanguage::HlslD3d11
        )
    }

    /// Whether precision statements are legal and meaningful
    pub fn has_precision_statements(&self) -> bool {
        matches!(
            self.shading_language,
            ShaderLanguage::DesktopGlsl | ShaderLanguage::EmbeddedGlsl
        ) && self.is_embedded_profile
    }

    /// Whether `flat` interpolation can be requested
    pub fn supports_flat_varyings(&self) -> bool {
        match self.shading_language {
            ShaderLanguage::GlslVulkan | ShaderLanguage::HlslD3d11 => true,
            ShaderLanguage::DesktopGlsl | ShaderLanguage::EmbeddedGlsl => {
                self.supports_es30_syntax
            }
            ShaderLanguage::HlslD3d9 => false,
        }
    }

    /// Vertex attribute declaration keyword (GLSL family)
    pub fn attribute(&self) -> &'static str {
        if self.uses_es30_keywords() { "in" } else { "attribute" }
    }

    /// Varying keyword for the given stage (GLSL family)
    pub fn varying(&self, vertex_stage: bool) -> &'static str {
        match (self.uses_es30_keywords(), vertex_stage) {
            (true, true) => "out",
            (true, false) => "in",
            (false, _) => "varying",
        }
    }

    /// Name of the fragment color output (GLSL family)
    pub fn frag_color0(&self) -> &'static str {
        if self.uses_es30_keywords() { "fragColor0" } else { "gl_FragColor" }
    }

    /// 2D texture sampling builtin (GLSL family)
    pub fn texture_fn(&self) -> &'static str {
        if self.uses_es30_keywords() { "texture" } else { "texture2D" }
    }

    fn uses_es30_keywords(&self) -> bool {
        self.shading_language == ShaderLanguage::GlslVulkan || self.supports_es30_syntax
    }
}

impl Default for DialectDescriptor {
    fn default() -> Self {
        Self::preset(ShaderLanguage::DesktopGlsl)
    }
}

impl fmt::Display for DialectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.shading_language)?;
        if self.shading_language.is_glsl() {
            write!(f, " {}", self.glsl_version_number)?;
            if self.is_embedded_profile {
                f.write_str(" es")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn presets_gate_bitwise_ops() {
        assert!(!DialectDescriptor::preset(ShaderLanguage::HlslD3d9).has_bitwise_integer_ops);
        assert!(DialectDescriptor::preset(ShaderLanguage::HlslD3d11).has_bitwise_integer_ops);
        assert!(!DialectDescriptor::gles2().has_bitwise_integer_ops);
        assert_eq!(
            DialectDescriptor::preset(ShaderLanguage::GlslVulkan).glsl_version_number,
            450
        );
    }

    #[test]
    fn legacy_glsl_keywords() {
        let gles2 = DialectDescriptor::gles2();
        assert_eq!(gles2.attribute(), "attribute");
        assert_eq!(gles2.varying(true), "varying");
        assert_eq!(gles2.frag_color0(), "gl_FragColor");
        assert_eq!(gles2.texture_fn(), "texture2D");

        let gles3 = DialectDescriptor::preset(ShaderLanguage::EmbeddedGlsl);
        assert_eq!(gles3.attribute(), "in");
        assert_eq!(gles3.varying(true), "out");
        assert_eq!(gles3.varying(false), "in");
        assert_eq!(gles3.frag_color0(), "fragColor0");
    }

    #[test]
    fn precision_statements_only_on_embedded_glsl() {
        assert!(DialectDescriptor::preset(ShaderLanguage::EmbeddedGlsl).has_precision_statements());
        assert!(!DialectDescriptor::preset(ShaderLanguage::DesktopGlsl).has_precision_statements());
        assert!(!DialectDescriptor::preset(ShaderLanguage::GlslVulkan).has_precision_statements());
    }

    #[test]
    fn language_names_parse_back() {
        for lang in ShaderLanguage::ALL {
            assert_eq!(lang.name().parse::<ShaderLanguage>(), Ok(lang));
        }
        assert_eq!("HLSL_D3D11".parse::<ShaderLanguage>(), Ok(ShaderLanguage::HlslD3d11));
        assert!("metal".parse::<ShaderLanguage>().is_err());
    }

    #[test]
    fn toml_config_roundtrip() {
        let text = r#"
shading_language = "embedded-glsl"
glsl_version_number = 310
is_embedded_profile = true
supports_es30_syntax = true
has_bitwise_integer_ops = true
driver_info = "Mali-G78"
"#;
        let dialect = DialectDescriptor::from_toml_str(text).unwrap();
        assert_eq!(dialect.shading_language, ShaderLanguage::EmbeddedGlsl);
        assert_eq!(dialect.glsl_version_number, 310);
        assert_eq!(dialect.driver_info.as_deref(), Some("Mali-G78"));

        let serialized = toml::to_string(&dialect).unwrap();
        assert_eq!(DialectDescriptor::from_toml_str(&serialized).unwrap(), dialect);
    }

    #[test]
    fn toml_config_defaults_missing_flags() {
        let dialect = DialectDescriptor::from_toml_str("shading_language = \"hlsl-d3d9\"").unwrap();
        assert!(!dialect.has_bitwise_integer_ops);
        assert!(!dialect.is_embedded_profile);
        assert_eq!(dialect.driver_info, None);
    }

    #[test]
    fn toml_config_rejects_unknown_language() {
        let err = DialectDescriptor::from_toml_str("shading_language = \"metal\"").unwrap_err();
        assert!(matches!(err, ShaderGenError::InvalidDialectConfig(_)));
    }

    #[test]
    fn load_reads_file_and_reports_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "shading_language = \"glsl-vulkan\"").unwrap();
        writeln!(file, "glsl_version_number = 450").unwrap();
        let dialect = DialectDescriptor::load(file.path()).unwrap();
        assert_eq!(dialect.shading_language, ShaderLanguage::GlslVulkan);

        let dir = tempfile::tempdir().unwrap();
        let err = DialectDescriptor::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ShaderGenError::ConfigIo { .. }));
    }
}
