//! Append-only shader source writer.
//!
//! Body generators write a single GLSL-like surface syntax through
//! `ShaderWriter`. The preamble emitted on construction defines macros that
//! retarget that syntax to the dialect, and the `begin_*`/`end_*` helpers
//! produce the per-dialect entry point scaffolding.
//!
//! The writer appends to a caller-owned `String`, so a write can never run
//! past the end of the buffer; capacity is only a performance hint.

mod preamble;

use std::fmt::{self, Write as _};

use crate::dialect::{DialectDescriptor, ShaderLanguage};

/// Fixed output buffer size for generated sources. Generated programs
/// are expected to stay well inside it.
pub const MAX_SHADER_SOURCE_LEN: usize = 65536;

/// Texture bindings on Vulkan start after the uniform block
const VULKAN_TEXTURE_BINDING_BASE: u32 = 1;

/// Pipeline stage a writer produces code for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Vertex input / varying semantic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semantic {
    Position,
    Color0,
    Color1,
    TexCoord0,
    TexCoord1,
    Normal,
}

impl Semantic {
    pub const fn hlsl_name(self) -> &'static str {
        match self {
            Semantic::Position => "POSITION",
            Semantic::Color0 => "COLOR0",
            Semantic::Color1 => "COLOR1",
            Semantic::TexCoord0 => "TEXCOORD0",
            Semantic::TexCoord1 => "TEXCOORD1",
            Semantic::Normal => "NORMAL",
        }
    }

    /// Attribute location used for Vulkan vertex inputs
    pub const fn location(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputDef {
    pub type_name: &'static str,
    pub name: &'static str,
    pub semantic: Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaryingDef {
    pub type_name: &'static str,
    pub name: &'static str,
    pub semantic: Semantic,
    pub index: u32,
    pub precision: Option<&'static str>,
    pub flat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDef {
    pub type_name: &'static str,
    pub name: String,
    /// Array length, 1 for a plain uniform
    pub count: u32,
}

impl UniformDef {
    pub fn new(type_name: &'static str, name: impl Into<String>) -> Self {
        Self {
            type_name,
            name: name.into(),
            count: 1,
        }
    }

    pub fn array(type_name: &'static str, name: impl Into<String>, count: u32) -> Self {
        Self {
            type_name,
            name: name.into(),
            count,
        }
    }

    fn declarator(&self) -> String {
        if self.count > 1 {
            format!("{}[{}]", self.name, self.count)
        } else {
            self.name.clone()
        }
    }

    /// Constant registers taken on shader model 3
    fn register_count(&self) -> u32 {
        let per_element = match self.type_name {
            "mat4" => 4,
            "mat3x4" => 3,
            _ => 1,
        };
        per_element * self.count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerDef {
    pub name: &'static str,
    pub binding: u32,
}

/// Shader source writer bound to one dialect and stage
pub struct ShaderWriter<'a> {
    out: &'a mut String,
    start: usize,
    lang: &'a DialectDescriptor,
    stage: ShaderStage,
    samplers: Vec<SamplerDef>,
}

impl<'a> ShaderWriter<'a> {
    /// Bind to `out` and emit the dialect preamble.
    ///
    /// `extensions` are full `#extension` lines, written right after the
    /// version line on GLSL targets and ignored on HLSL.
    pub fn new<S: AsRef<str>>(
        out: &'a mut String,
        lang: &'a DialectDescriptor,
        stage: ShaderStage,
        extensions: &[S],
    ) -> Self {
        let start = out.len();
        let mut writer = Self {
            out,
            start,
            lang,
            stage,
            samplers: Vec::new(),
        };
        writer.emit_preamble(extensions);
        writer
    }

    pub fn lang(&self) -> &'a DialectDescriptor {
        self.lang
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Everything this writer has produced so far
    pub fn as_str(&self) -> &str {
        &self.out[self.start..]
    }

    pub fn len(&self) -> usize {
        self.out.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verbatim write of constant text
    pub fn c(&mut self, text: &'static str) -> &mut Self {
        self.out.push_str(text);
        self
    }

    /// Write of runtime text
    pub fn w(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text);
        self
    }

    /// Formatted write, used as `p.f(format_args!(...))`
    pub fn f(&mut self, args: fmt::Arguments<'_>) -> &mut Self {
        // Formatting into a String cannot fail.
        let _ = self.out.write_fmt(args);
        self
    }

    /// Drop the last `count` bytes (never past the start of this writer)
    pub fn rewind(&mut self, count: usize) -> &mut Self {
        let len = self.out.len().saturating_sub(count).max(self.start);
        self.out.truncate(len);
        self
    }

    pub fn high_precision_float(&mut self) -> &mut Self {
        if self.lang.has_precision_statements() {
            self.c("precision highp float;\n");
        }
        self
    }

    pub fn begin_vs_main(
        &mut self,
        inputs: &[InputDef],
        uniforms: &[UniformDef],
        varyings: &[VaryingDef],
    ) -> &mut Self {
        debug_assert_eq!(self.stage, ShaderStage::Vertex);
        let lang = self.lang;
        match lang.shading_language {
            ShaderLanguage::HlslD3d9 | ShaderLanguage::HlslD3d11 => {
                self.declare_uniforms(uniforms);
                self.c("struct VS_OUTPUT {\n");
                for varying in varyings {
                    self.f(format_args!(
                        "  {}{} {} : {};\n",
                        self.interpolation(varying),
                        varying.type_name,
                        varying.name,
                        varying.semantic.hlsl_name()
                    ));
                }
                self.f(format_args!(
                    "  vec4 pos : {};\n",
                    if lang.shading_language == ShaderLanguage::HlslD3d11 {
                        "SV_Position"
                    } else {
                        "POSITION"
                    }
                ));
                self.c("};\n\n");
                self.c("VS_OUTPUT main(");
                for input in inputs {
                    self.f(format_args!(
                        "in {} {} : {}, ",
                        input.type_name,
                        input.name,
                        input.semantic.hlsl_name()
                    ));
                }
                if !inputs.is_empty() {
                    // Drop the trailing ", "
                    self.rewind(2);
                }
                self.c(") {\n");
                self.c("  vec4 gl_Position;\n");
                for varying in varyings {
                    self.f(format_args!("  {} {};\n", varying.type_name, varying.name));
                }
            }
            ShaderLanguage::GlslVulkan => {
                for input in inputs {
                    self.f(format_args!(
                        "layout(location = {}) in {} {};\n",
                        input.semantic.location(),
                        input.type_name,
                        input.name
                    ));
                }
                self.declare_uniforms(uniforms);
                for varying in varyings {
                    self.f(format_args!(
                        "layout(location = {}) {}out {}{} {};\n",
                        varying.index,
                        self.interpolation(varying),
                        precision(varying),
                        varying.type_name,
                        varying.name
                    ));
                }
                self.c("\nvoid main() {\n");
            }
            ShaderLanguage::DesktopGlsl | ShaderLanguage::EmbeddedGlsl => {
                for input in inputs {
                    self.f(format_args!(
                        "{} {} {};\n",
                        lang.attribute(),
                        input.type_name,
                        input.name
                    ));
                }
                self.declare_uniforms(uniforms);
                for varying in varyings {
                    self.f(format_args!(
                        "{}{} {}{} {};\n",
                        self.interpolation(varying),
                        lang.varying(true),
                        precision(varying),
                        varying.type_name,
                        varying.name
                    ));
                }
                self.c("\nvoid main() {\n");
            }
        }
        self
    }

    pub fn end_vs_main(&mut self, varyings: &[VaryingDef]) -> &mut Self {
        debug_assert_eq!(self.stage, ShaderStage::Vertex);
        if self.lang.shading_language.is_hlsl() {
            self.c("  VS_OUTPUT vs_out;\n");
            self.c("  vs_out.pos = gl_Position;\n");
            for varying in varyings {
                self.f(format_args!("  vs_out.{} = {};\n", varying.name, varying.name));
            }
            self.c("  return vs_out;\n");
        }
        self.c("}\n")
    }

    pub fn begin_fs_main(&mut self, uniforms: &[UniformDef], varyings: &[VaryingDef]) -> &mut Self {
        debug_assert_eq!(self.stage, ShaderStage::Fragment);
        let lang = self.lang;
        match lang.shading_language {
            ShaderLanguage::HlslD3d9 | ShaderLanguage::HlslD3d11 => {
                self.declare_uniforms(uniforms);
                self.c("struct PS_OUT {\n");
                self.f(format_args!(
                    "  vec4 target : {};\n",
                    if lang.shading_language == ShaderLanguage::HlslD3d11 {
                        "SV_Target0"
                    } else {
                        "COLOR0"
                    }
                ));
                self.c("};\n\n");
                self.c("PS_OUT main(");
                for varying in varyings {
                    self.f(format_args!(
                        "in {}{} {} : {}, ",
                        self.interpolation(varying),
                        varying.type_name,
                        varying.name,
                        varying.semantic.hlsl_name()
                    ));
                }
                if !varyings.is_empty() {
                    self.rewind(2);
                }
                self.c(") {\n");
                self.c("  PS_OUT ps_out;\n");
            }
            ShaderLanguage::GlslVulkan => {
                for varying in varyings {
                    self.f(format_args!(
                        "layout(location = {}) {}in {}{} {};\n",
                        varying.index,
                        self.interpolation(varying),
                        precision(varying),
                        varying.type_name,
                        varying.name
                    ));
                }
                self.c("layout(location = 0, index = 0) out vec4 fragColor0;\n");
                self.declare_uniforms(uniforms);
                self.c("\nvoid main() {\n");
            }
            ShaderLanguage::DesktopGlsl | ShaderLanguage::EmbeddedGlsl => {
                for varying in varyings {
                    self.f(format_args!(
                        "{}{} {}{} {};\n",
                        self.interpolation(varying),
                        lang.varying(false),
                        precision(varying),
                        varying.type_name,
                        varying.name
                    ));
                }
                self.declare_uniforms(uniforms);
                if lang.frag_color0() == "fragColor0" {
                    self.c("out vec4 fragColor0;\n");
                }
                self.c("\nvoid main() {\n");
            }
        }
        self
    }

    /// Write `color` to the render target and close the entry point
    pub fn end_fs_main(&mut self, color: &str) -> &mut Self {
        debug_assert_eq!(self.stage, ShaderStage::Fragment);
        if self.lang.shading_language.is_hlsl() {
            self.f(format_args!("  ps_out.target = {};\n", color));
            self.c("  return ps_out;\n");
        } else {
            self.f(format_args!("  {} = {};\n", self.lang.frag_color0(), color));
        }
        self.c("}\n")
    }

    pub fn declare_samplers(&mut self, samplers: &[SamplerDef]) -> &mut Self {
        for sampler in samplers {
            match self.lang.shading_language {
                ShaderLanguage::HlslD3d11 => {
                    self.f(format_args!(
                        "Texture2D<float4> {} : register(t{});\n",
                        sampler.name, sampler.binding
                    ));
                    self.f(format_args!(
                        "SamplerState {}Samp : register(s{});\n",
                        sampler.name, sampler.binding
                    ));
                }
                ShaderLanguage::HlslD3d9 => {
                    self.f(format_args!(
                        "sampler {} : register(s{});\n",
                        sampler.name, sampler.binding
                    ));
                }
                ShaderLanguage::GlslVulkan => {
                    self.f(format_args!(
                        "layout(set = 0, binding = {}) uniform sampler2D {};\n",
                        sampler.binding + VULKAN_TEXTURE_BINDING_BASE,
                        sampler.name
                    ));
                }
                ShaderLanguage::DesktopGlsl | ShaderLanguage::EmbeddedGlsl => {
                    self.f(format_args!("uniform sampler2D {};\n", sampler.name));
                }
            }
        }
        self.samplers.extend_from_slice(samplers);
        self
    }

    /// Expression sampling a declared 2D texture
    pub fn sample_texture_2d(&mut self, sampler: &str, uv: &str) -> &mut Self {
        debug_assert!(
            self.samplers.iter().any(|s| s.name == sampler),
            "sampler {} was not declared",
            sampler
        );
        match self.lang.shading_language {
            ShaderLanguage::HlslD3d11 => {
                self.f(format_args!("{}.Sample({}Samp, {})", sampler, sampler, uv))
            }
            ShaderLanguage::HlslD3d9 => self.f(format_args!("tex2D({}, {})", sampler, uv)),
            ShaderLanguage::GlslVulkan
            | ShaderLanguage::DesktopGlsl
            | ShaderLanguage::EmbeddedGlsl => {
                self.f(format_args!("{}({}, {})", self.lang.texture_fn(), sampler, uv))
            }
        }
    }

    fn declare_uniforms(&mut self, uniforms: &[UniformDef]) {
        if uniforms.is_empty() {
            return;
        }
        match self.lang.shading_language {
            ShaderLanguage::HlslD3d11 => {
                self.c("cbuffer base : register(b0) {\n");
                for uniform in uniforms {
                    self.f(format_args!("  {} {};\n", uniform.type_name, uniform.declarator()));
                }
                self.c("};\n");
            }
            ShaderLanguage::HlslD3d9 => {
                let mut register = 0;
                for uniform in uniforms {
                    self.f(format_args!(
                        "{} {} : register(c{});\n",
                        uniform.type_name,
                        uniform.declarator(),
                        register
                    ));
                    register += uniform.register_count();
                }
            }
            ShaderLanguage::GlslVulkan => {
                self.c("layout(std140, set = 0, binding = 0) uniform base {\n");
                for uniform in uniforms {
                    self.f(format_args!("  {} {};\n", uniform.type_name, uniform.declarator()));
                }
                self.c("};\n");
            }
            ShaderLanguage::DesktopGlsl | ShaderLanguage::EmbeddedGlsl => {
                for uniform in uniforms {
                    self.f(format_args!(
                        "uniform {} {};\n",
                        uniform.type_name,
                        uniform.declarator()
                    ));
                }
            }
        }
    }

    fn interpolation(&self, varying: &VaryingDef) -> &'static str {
        if !varying.flat || !self.lang.supports_flat_varyings() {
            ""
        } else if self.lang.shading_language.is_hlsl() {
            "nointerpolation "
        } else {
            "flat "
        }
    }
}

fn precision(varying: &VaryingDef) -> String {
    varying
        .precision
        .map(|p| format!("{} ", p))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests;
