//! Whole-program entry points.
//!
//! `ShaderSourceCompiler` binds a dialect and the extension lines the backend
//! wants in every program, then turns keys and format pairs into source text.
//! Each call is independent; the compiler holds no state besides its
//! configuration and can be shared across threads.

use xxhash_rust::xxh3::xxh3_64;

use crate::ShaderGenError;
use crate::dialect::DialectDescriptor;
use crate::fragment;
use crate::ge_constants::PixelFormat;
use crate::key::VShaderId;
use crate::vertex::{self, VertexShaderFlags};
use crate::writer::{MAX_SHADER_SOURCE_LEN, ShaderStage};

/// Generated program text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedShader {
    pub stage: ShaderStage,
    pub source: String,
}

impl GeneratedShader {
    /// xxh3 hash of the source, stable across runs
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(self.source.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

/// Source compiler for one target dialect
#[derive(Debug, Clone, Default)]
pub struct ShaderSourceCompiler {
    dialect: DialectDescriptor,
    extensions: Vec<String>,
}

impl ShaderSourceCompiler {
    pub fn new(dialect: DialectDescriptor) -> Self {
        Self {
            dialect,
            extensions: Vec::new(),
        }
    }

    /// Add an `#extension` line written after `#version` in GLSL programs
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    pub fn dialect(&self) -> &DialectDescriptor {
        &self.dialect
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Vertex program for `id`, with the facts the fragment side needs
    pub fn vertex_shader(&self, id: VShaderId) -> Result<(GeneratedShader, VertexShaderFlags), ShaderGenError> {
        tracing::debug!("Generating vertex shader {} for {}", id, self.dialect);
        let mut source = String::with_capacity(MAX_SHADER_SOURCE_LEN / 8);
        let flags = vertex::write_vertex_shader(&mut source, id, &self.dialect, &self.extensions)?;
        Ok((self.finish(ShaderStage::Vertex, source), flags))
    }

    /// Fragment program reading a texture rendered as `from` and writing it
    /// back as if it had been rendered as `to`
    pub fn reinterpret_shader(&self, from: PixelFormat, to: PixelFormat) -> Result<GeneratedShader, ShaderGenError> {
        tracing::debug!("Generating reinterpret shader {} -> {} for {}", from, to, self.dialect);
        let mut source = String::with_capacity(MAX_SHADER_SOURCE_LEN / 16);
        fragment::write_reinterpret_shader(&mut source, from, to, &self.dialect, &self.extensions)?;
        Ok(self.finish(ShaderStage::Fragment, source))
    }

    /// Fragment program matching a vertex program's color outputs
    pub fn color_fragment_shader(&self, vertex: &VertexShaderFlags) -> GeneratedShader {
        tracing::debug!("Generating color fragment shader {:?} for {}", vertex, self.dialect);
        let mut source = String::with_capacity(MAX_SHADER_SOURCE_LEN / 16);
        fragment::write_color_fragment_shader(&mut source, &self.dialect, vertex, &self.extensions);
        self.finish(ShaderStage::Fragment, source)
    }

    fn finish(&self, stage: ShaderStage, source: String) -> GeneratedShader {
        if source.len() >= MAX_SHADER_SOURCE_LEN {
            tracing::warn!(
                "{:?} shader for {} is {} bytes, over the {} byte limit",
                stage,
                self.dialect,
                source.len(),
                MAX_SHADER_SOURCE_LEN
            );
        }
        GeneratedShader { stage, source }
    }
}

/// Vertex program for `id` in `dialect`
pub fn generate_vertex_shader(
    id: VShaderId,
    dialect: &DialectDescriptor,
) -> Result<(GeneratedShader, VertexShaderFlags), ShaderGenError> {
    ShaderSourceCompiler::new(dialect.clone()).vertex_shader(id)
}

/// Reinterpret fragment program in `dialect`
pub fn generate_reinterpret_shader(
    from: PixelFormat,
    to: PixelFormat,
    dialect: &DialectDescriptor,
) -> Result<GeneratedShader, ShaderGenError> {
    ShaderSourceCompiler::new(dialect.clone()).reinterpret_shader(from, to)
}

/// Color fragment program in `dialect`
pub fn generate_color_fragment_shader(dialect: &DialectDescriptor, vertex: &VertexShaderFlags) -> GeneratedShader {
    ShaderSourceCompiler::new(dialect.clone()).color_fragment_shader(vertex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::ShaderLanguage;

    #[test]
    fn extensions_follow_version_line() {
        let compiler = ShaderSourceCompiler::new(DialectDescriptor::preset(ShaderLanguage::EmbeddedGlsl))
            .with_extension("#extension GL_EXT_gpu_shader4 : enable");
        let (shader, _) = compiler.vertex_shader(VShaderId::new()).unwrap();
        let mut lines = shader.source.lines();
        assert_eq!(lines.next(), Some("#version 300 es"));
        assert_eq!(lines.next(), Some("#extension GL_EXT_gpu_shader4 : enable"));
    }

    #[test]
    fn extensions_are_dropped_for_hlsl() {
        let compiler = ShaderSourceCompiler::new(DialectDescriptor::preset(ShaderLanguage::HlslD3d11))
            .with_extension("#extension GL_EXT_gpu_shader4 : enable");
        let (shader, _) = compiler.vertex_shader(VShaderId::new()).unwrap();
        assert!(!shader.source.contains("#extension"));
    }

    #[test]
    fn fingerprint_tracks_source() {
        let dialect = DialectDescriptor::default();
        let a = generate_reinterpret_shader(PixelFormat::Rgb565, PixelFormat::Rgba4444, &dialect).unwrap();
        let b = generate_reinterpret_shader(PixelFormat::Rgb565, PixelFormat::Rgba5551, &dialect).unwrap();
        assert_eq!(a.stage, ShaderStage::Fragment);
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), xxh3_64(a.source.as_bytes()));
    }

    #[test]
    fn driver_info_comment() {
        let dialect = DialectDescriptor::preset(ShaderLanguage::DesktopGlsl).with_driver_info("Mesa 24.1");
        let shader = generate_color_fragment_shader(&dialect, &VertexShaderFlags::default());
        assert!(shader.source.starts_with("#version 330\n// Driver: Mesa 24.1\n"));
    }
}
