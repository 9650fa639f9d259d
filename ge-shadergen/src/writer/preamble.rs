//! Dialect-bridging headers, as data.
//!
//! Each (language, stage) pair maps to an ordered list of line blocks. The
//! match in `preamble_blocks` is exhaustive, so a new language or stage cannot
//! be added without deciding its preamble.

use super::{ShaderStage, ShaderWriter};
use crate::dialect::{DialectDescriptor, ShaderLanguage};

type Block = &'static [&'static str];

const VULKAN_VERSION: u32 = 450;

const VULKAN_EXTENSIONS: Block = &[
    "#extension GL_ARB_separate_shader_objects : enable",
    "#extension GL_ARB_shading_language_420pack : enable",
];

const VULKAN_FS_EXTENSIONS: Block = &[
    "#extension GL_ARB_conservative_depth : enable",
    "#extension GL_ARB_shader_image_load_store : enable",
];

/// Vulkan GLSL follows desktop precision semantics
const NULL_PRECISION: Block = &["#define lowp", "#define mediump", "#define highp"];

const GLSL_HELPERS: Block = &["#define splat3(x) vec3(x)", "#define mul(x, y) ((x) * (y))"];

const GLSL_DISCARD: Block = &["#define DISCARD discard"];

const GLSL_ES_VS_PRECISION: Block = &["precision highp float;"];
const GLSL_ES_FS_PRECISION: Block = &["precision lowp float;"];
const GLSL_ES3_FS_INT_PRECISION: Block = &["precision highp int;"];

const HLSL_ALIASES: Block = &[
    "#define vec2 float2",
    "#define vec3 float3",
    "#define vec4 float4",
    "#define uvec3 uint3",
    "#define uvec4 uint4",
    "#define ivec2 int2",
    "#define ivec3 int3",
    "#define ivec4 int4",
    "#define mat2 float2x2",
    "#define mat4 float4x4",
    // HLSL names matrices rows x columns and GLSL columns x rows, so the
    // GLSL mat3x4 is float4x3 here. Matrix code relies on this inversion.
    "#define mat3x4 float4x3",
    "#define splat3(x) float3(x, x, x)",
    "#define mix lerp",
    "#define fract frac",
    "#define mod(x, y) fmod(x, y)",
    "#define lowp",
    "#define mediump",
    "#define highp",
];

// Same calling convention on both, only the expansion differs.
const HLSL_D3D9_FS: Block = &["#define DISCARD clip(-1)", "#define DISCARD_BELOW(x) clip(x)"];
const HLSL_D3D11_FS: Block = &["#define DISCARD discard", "#define DISCARD_BELOW(x) clip(x)"];

/// Fixed declaration blocks for a dialect and stage, in emission order
pub(crate) fn preamble_blocks(lang: &DialectDescriptor, stage: ShaderStage) -> Vec<Block> {
    match (lang.shading_language, stage) {
        (ShaderLanguage::GlslVulkan, ShaderStage::Vertex) => {
            vec![VULKAN_EXTENSIONS, GLSL_HELPERS, NULL_PRECISION]
        }
        (ShaderLanguage::GlslVulkan, ShaderStage::Fragment) => vec![
            VULKAN_EXTENSIONS,
            VULKAN_FS_EXTENSIONS,
            GLSL_HELPERS,
            NULL_PRECISION,
            GLSL_DISCARD,
        ],
        (ShaderLanguage::HlslD3d9 | ShaderLanguage::HlslD3d11, ShaderStage::Vertex) => {
            vec![HLSL_ALIASES]
        }
        (ShaderLanguage::HlslD3d9, ShaderStage::Fragment) => vec![HLSL_ALIASES, HLSL_D3D9_FS],
        (ShaderLanguage::HlslD3d11, ShaderStage::Fragment) => vec![HLSL_ALIASES, HLSL_D3D11_FS],
        (ShaderLanguage::DesktopGlsl | ShaderLanguage::EmbeddedGlsl, stage) => {
            let mut blocks = Vec::with_capacity(4);
            match stage {
                ShaderStage::Fragment => {
                    blocks.push(GLSL_DISCARD);
                    if lang.is_embedded_profile {
                        blocks.push(GLSL_ES_FS_PRECISION);
                        if lang.supports_es30_syntax {
                            blocks.push(GLSL_ES3_FS_INT_PRECISION);
                        }
                    }
                }
                ShaderStage::Vertex => {
                    if lang.is_embedded_profile {
                        blocks.push(GLSL_ES_VS_PRECISION);
                    }
                }
            }
            if !lang.is_embedded_profile {
                blocks.push(NULL_PRECISION);
            }
            blocks.push(GLSL_HELPERS);
            blocks
        }
    }
}

impl ShaderWriter<'_> {
    pub(super) fn emit_preamble<S: AsRef<str>>(&mut self, extensions: &[S]) {
        let lang = self.lang;
        match lang.shading_language {
            ShaderLanguage::GlslVulkan => {
                let version = match lang.glsl_version_number {
                    0 => VULKAN_VERSION,
                    n => n,
                };
                self.f(format_args!("#version {}\n", version));
                // Extensions must come right after #version
                self.write_extensions(extensions);
            }
            ShaderLanguage::HlslD3d9 | ShaderLanguage::HlslD3d11 => {}
            ShaderLanguage::DesktopGlsl | ShaderLanguage::EmbeddedGlsl => {
                let es = if lang.is_embedded_profile && lang.supports_es30_syntax {
                    " es"
                } else {
                    ""
                };
                self.f(format_args!("#version {}{}\n", lang.glsl_version_number, es));
                self.write_extensions(extensions);
                if let Some(info) = lang.driver_info.as_deref().filter(|info| !info.is_empty()) {
                    self.f(format_args!("// Driver: {}\n", info));
                }
            }
        }

        for block in preamble_blocks(lang, self.stage) {
            for &line in block {
                self.c(line).c("\n");
            }
        }
        if lang.shading_language.is_glsl() {
            self.c("\n");
        }
    }

    fn write_extensions<S: AsRef<str>>(&mut self, extensions: &[S]) {
        for extension in extensions {
            self.w(extension.as_ref()).c("\n");
        }
    }
}
