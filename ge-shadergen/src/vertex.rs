//! Vertex program generation from a `VShaderId`.
//!
//! Three shapes of program come out of here:
//! - through mode: positions are already in screen space
//! - software transform: positions arrive transformed and lit
//! - hardware transform: world/view/projection transform, optional
//!   tessellated inputs, the lighting clause and UV generation

use crate::ShaderGenError;
use crate::dialect::{DialectDescriptor, ShaderLanguage};
use crate::ge_constants::{LightComputation, LightType, TessellationMode, UvGenMode};
use crate::key::{NUM_LIGHTS, VShaderId};
use crate::lighting::{self, DoLightComputation};
use crate::writer::{InputDef, Semantic, ShaderStage, ShaderWriter, UniformDef, VaryingDef};

/// Facts about a generated vertex program the matching fragment program
/// needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexShaderFlags {
    /// No specular was accumulated, so `v_color1` carries nothing
    pub specular_is_zero: bool,
    pub uses_lighting: bool,
    /// Specular goes to a separate `v_color1` varying
    pub secondary_color: bool,
    /// Color varyings use flat interpolation
    pub flat_shade: bool,
}

const V_TEXCOORD: VaryingDef = VaryingDef {
    type_name: "vec3",
    name: "v_texcoord",
    semantic: Semantic::TexCoord0,
    index: 0,
    precision: Some("highp"),
    flat: false,
};

/// Color varyings shared by the vertex and color fragment programs
pub(crate) fn color_varyings(secondary_color: bool, flat: bool) -> Vec<VaryingDef> {
    let mut varyings = vec![VaryingDef {
        type_name: "vec4",
        name: "v_color0",
        semantic: Semantic::Color0,
        index: 1,
        precision: Some("lowp"),
        flat,
    }];
    if secondary_color {
        varyings.push(VaryingDef {
            type_name: "vec3",
            name: "v_color1",
            semantic: Semantic::Color1,
            index: 2,
            precision: Some("lowp"),
            flat,
        });
    }
    varyings
}

/// Decoded key fields after hardware-transform gating
struct VertexFeatures {
    through: bool,
    hw: bool,
    has_color: bool,
    has_normal: bool,
    has_texcoord: bool,
    secondary_color: bool,
    tessellate: bool,
    lighting: bool,
}

impl VertexFeatures {
    fn new(id: VShaderId) -> Self {
        let through = id.is_through();
        let hw = id.use_hw_transform() && !through;
        Self {
            through,
            hw,
            // Software-transformed vertices always carry color and UVs
            has_color: id.has_color() || !hw,
            has_normal: id.has_normal() && hw,
            has_texcoord: id.has_texcoord() || !hw,
            secondary_color: id.lmode(),
            tessellate: hw && id.tessellation() != TessellationMode::None,
            lighting: hw && id.lighting_enabled(),
        }
    }
}

/// Reject keys this dialect cannot express, before anything is written
fn check_supported(features: &VertexFeatures, lang: &DialectDescriptor) -> Result<(), ShaderGenError> {
    if !features.tessellate {
        return Ok(());
    }
    if !features.has_normal {
        return Err(ShaderGenError::UnsupportedKey {
            reason: "tessellation requires normals",
            language: lang.shading_language,
        });
    }
    if lang.shading_language == ShaderLanguage::HlslD3d9 {
        return Err(ShaderGenError::UnsupportedKey {
            reason: "tessellation is not available on shader model 3",
            language: lang.shading_language,
        });
    }
    Ok(())
}

/// Non-square matrices need GLSL 1.30 / ES 3.00
fn affine_matrix_type(lang: &DialectDescriptor) -> &'static str {
    if lang.shading_language.is_glsl()
        && lang.shading_language != ShaderLanguage::GlslVulkan
        && !lang.supports_es30_syntax
    {
        "mat4"
    } else {
        "mat3x4"
    }
}

fn inputs(features: &VertexFeatures) -> Vec<InputDef> {
    let mut inputs = vec![InputDef {
        type_name: if features.hw { "vec3" } else { "vec4" },
        name: "position",
        semantic: Semantic::Position,
    }];
    if features.has_normal {
        inputs.push(InputDef {
            type_name: "vec3",
            name: "normal",
            semantic: Semantic::Normal,
        });
    }
    if features.has_texcoord {
        inputs.push(InputDef {
            type_name: "vec2",
            name: "texcoord",
            semantic: Semantic::TexCoord0,
        });
    }
    if features.has_color {
        inputs.push(InputDef {
            type_name: "vec4",
            name: "color0",
            semantic: Semantic::Color0,
        });
        // Only software transform supplies a second color per vertex
        if features.secondary_color && !features.hw {
            inputs.push(InputDef {
                type_name: "vec3",
                name: "color1",
                semantic: Semantic::Color1,
            });
        }
    }
    inputs
}

fn uniforms(
    id: VShaderId,
    features: &VertexFeatures,
    do_light: &[DoLightComputation; NUM_LIGHTS],
    lang: &DialectDescriptor,
) -> Vec<UniformDef> {
    let mut uniforms = Vec::new();
    if features.through {
        uniforms.push(UniformDef::new("mat4", "u_proj_through"));
        return uniforms;
    }
    uniforms.push(UniformDef::new("mat4", "u_proj"));
    if !features.hw {
        return uniforms;
    }

    let affine = affine_matrix_type(lang);
    uniforms.push(UniformDef::new(affine, "u_world"));
    uniforms.push(UniformDef::new(affine, "u_view"));
    if id.uv_gen_mode() == UvGenMode::TextureMatrix {
        uniforms.push(UniformDef::new(affine, "u_texmtx"));
    }
    uniforms.push(UniformDef::new("vec4", "u_uvscaleoffset"));
    uniforms.push(UniformDef::new("vec4", "u_matambientalpha"));

    let any_light = do_light.iter().any(|&d| d != DoLightComputation::Off);
    if lang.uses_uniform_indexing() {
        // Fixed layout: every light field for every slot
        if any_light {
            uniforms.push(UniformDef::array("vec3", "u_lightpos", NUM_LIGHTS as u32));
        }
        if features.lighting {
            for (type_name, name) in [
                ("vec3", "u_lightatt"),
                ("vec3", "u_lightdir"),
                ("vec4", "u_lightangle_spotCoef"),
                ("vec3", "u_lightambient"),
                ("vec3", "u_lightdiffuse"),
                ("vec3", "u_lightspecular"),
            ] {
                uniforms.push(UniformDef::array(type_name, name, NUM_LIGHTS as u32));
            }
        }
    } else {
        for (i, &doing) in do_light.iter().enumerate() {
            if doing != DoLightComputation::Off {
                uniforms.push(UniformDef::new("vec3", format!("u_lightpos{}", i)));
            }
            if doing != DoLightComputation::Full {
                continue;
            }
            let slot = id.light(i);
            if slot.light_type != LightType::Directional {
                uniforms.push(UniformDef::new("vec3", format!("u_lightatt{}", i)));
            }
            if slot.light_type.is_spot_like() {
                uniforms.push(UniformDef::new("vec3", format!("u_lightdir{}", i)));
                uniforms.push(UniformDef::new("vec4", format!("u_lightangle_spotCoef{}", i)));
            }
            uniforms.push(UniformDef::new("vec3", format!("u_lightambient{}", i)));
            uniforms.push(UniformDef::new("vec3", format!("u_lightdiffuse{}", i)));
            if slot.computation == LightComputation::DiffuseAndSpecular {
                uniforms.push(UniformDef::new("vec3", format!("u_lightspecular{}", i)));
            }
        }
    }

    if features.lighting {
        uniforms.push(UniformDef::new("vec4", "u_ambient"));
        uniforms.push(UniformDef::new("vec3", "u_matdiffuse"));
        // Specular exponent lives in alpha
        uniforms.push(UniformDef::new("vec4", "u_matspecular"));
        uniforms.push(UniformDef::new("vec3", "u_matemissive"));
    }
    uniforms
}

/// Write a complete vertex program for `id` into `out`.
///
/// `out` is left untouched when the key cannot be expressed in `lang`.
pub fn write_vertex_shader<S: AsRef<str>>(
    out: &mut String,
    id: VShaderId,
    lang: &DialectDescriptor,
    extensions: &[S],
) -> Result<VertexShaderFlags, ShaderGenError> {
    let features = VertexFeatures::new(id);
    check_supported(&features, lang)?;

    let do_light = lighting::resolve_light_computations(id);
    let flat = id.flat_shade() && lang.supports_flat_varyings();
    let mut varyings = color_varyings(features.secondary_color, flat);
    varyings.push(V_TEXCOORD);
    let inputs = inputs(&features);
    let uniforms = uniforms(id, &features, &do_light, lang);

    let mut p = ShaderWriter::new(out, lang, ShaderStage::Vertex, extensions);
    p.f(format_args!("// {}\n", id));
    if features.tessellate {
        p.c("struct Tess {\n");
        p.c("  vec3 pos;\n");
        p.c("  vec2 tex;\n");
        p.c("  vec4 col;\n");
        p.c("  vec3 nrm;\n");
        p.c("};\n");
    }
    p.begin_vs_main(&inputs, &uniforms, &varyings);

    let flags = if features.through {
        p.c("  gl_Position = mul(u_proj_through, vec4(position.xyz, 1.0));\n");
        write_passthrough_colors(&mut p, &features);
        p.c("  v_texcoord = vec3(texcoord, 1.0);\n");
        VertexShaderFlags {
            specular_is_zero: true,
            ..Default::default()
        }
    } else if !features.hw {
        p.c("  gl_Position = mul(u_proj, vec4(position.xyz, 1.0));\n");
        write_passthrough_colors(&mut p, &features);
        p.c("  v_texcoord = vec3(texcoord, 1.0);\n");
        VertexShaderFlags {
            specular_is_zero: true,
            ..Default::default()
        }
    } else {
        write_hw_transform(&mut p, id, &features, &do_light)
    };

    p.end_vs_main(&varyings);
    tracing::trace!(bytes = p.len(), "Generated vertex shader");

    Ok(VertexShaderFlags {
        secondary_color: features.secondary_color,
        flat_shade: flat,
        ..flags
    })
}

fn write_passthrough_colors(p: &mut ShaderWriter<'_>, features: &VertexFeatures) {
    p.c("  v_color0 = color0;\n");
    if features.secondary_color {
        p.c("  v_color1 = color1;\n");
    }
}

fn write_hw_transform(
    p: &mut ShaderWriter<'_>,
    id: VShaderId,
    features: &VertexFeatures,
    do_light: &[DoLightComputation; NUM_LIGHTS],
) -> VertexShaderFlags {
    let (position, normal, texcoord) = if features.tessellate {
        p.c("  Tess tess;\n");
        p.c("  tess.pos = position;\n");
        if features.has_texcoord {
            p.c("  tess.tex = texcoord;\n");
        } else {
            p.c("  tess.tex = vec2(0.0, 0.0);\n");
        }
        if id.has_color_tess() && features.has_color {
            p.c("  tess.col = color0;\n");
        } else {
            p.c("  tess.col = u_matambientalpha;\n");
        }
        p.c("  tess.nrm = normal;\n");
        ("tess.pos", "tess.nrm", "tess.tex")
    } else {
        ("position", "normal", "texcoord")
    };

    p.f(format_args!(
        "  vec3 worldpos = mul(vec4({}, 1.0), u_world).xyz;\n",
        position
    ));
    if features.has_normal {
        let sign = if id.normals_reversed() { "-" } else { "" };
        p.f(format_args!(
            "  mediump vec3 worldnormal = normalize(mul(vec4({}{}, 0.0), u_world).xyz);\n",
            sign, normal
        ));
    } else {
        p.c("  mediump vec3 worldnormal = vec3(0.0, 0.0, 1.0);\n");
    }
    p.c("  vec4 viewPos = vec4(mul(vec4(worldpos, 1.0), u_view).xyz, 1.0);\n");
    p.c("  gl_Position = mul(u_proj, viewPos);\n");

    let lit = lighting::write_lighting(p, id, do_light);

    if features.lighting {
        if features.secondary_color {
            p.c("  v_color0 = clamp(lightSum0, 0.0, 1.0);\n");
            if lit.specular_is_zero {
                p.c("  v_color1 = splat3(0.0);\n");
            } else {
                p.c("  v_color1 = clamp(lightSum1, 0.0, 1.0);\n");
            }
        } else if lit.specular_is_zero {
            p.c("  v_color0 = clamp(lightSum0, 0.0, 1.0);\n");
        } else {
            p.c("  v_color0 = clamp(clamp(lightSum0, 0.0, 1.0) + vec4(lightSum1, 0.0), 0.0, 1.0);\n");
        }
    } else {
        if !features.has_color {
            p.c("  v_color0 = u_matambientalpha;\n");
        } else if features.tessellate {
            p.c("  v_color0 = tess.col;\n");
        } else {
            p.c("  v_color0 = color0;\n");
        }
        if features.secondary_color {
            p.c("  v_color1 = splat3(0.0);\n");
        }
    }

    write_uv_generation(p, id, features, texcoord);

    VertexShaderFlags {
        specular_is_zero: !features.lighting || lit.specular_is_zero,
        uses_lighting: features.lighting,
        ..Default::default()
    }
}

fn write_uv_generation(p: &mut ShaderWriter<'_>, id: VShaderId, features: &VertexFeatures, texcoord: &str) {
    match id.uv_gen_mode() {
        UvGenMode::TextureCoords | UvGenMode::Unknown => {
            if features.has_texcoord {
                p.f(format_args!(
                    "  v_texcoord = vec3({}.xy * u_uvscaleoffset.xy + u_uvscaleoffset.zw, 0.0);\n",
                    texcoord
                ));
            } else {
                p.c("  v_texcoord = vec3(u_uvscaleoffset.zw, 0.0);\n");
            }
        }
        UvGenMode::TextureMatrix => {
            let source = if features.has_texcoord {
                format!("vec4({}.xy, 0.0, 1.0)", texcoord)
            } else {
                "vec4(0.0, 0.0, 0.0, 1.0)".to_string()
            };
            p.f(format_args!(
                "  v_texcoord = mul({}, u_texmtx).xyz * vec3(u_uvscaleoffset.xy, 1.0);\n",
                source
            ));
        }
        UvGenMode::EnvironmentMap => {
            let lang = p.lang();
            let (ls0, ls1) = id.shade_light_sources();
            let factor = |ls: usize| {
                let n = lighting::light_uniform_suffix(lang, ls);
                format!("(length(u_lightpos{n}) == 0.0 ? worldnormal.z : dot(normalize(u_lightpos{n}), worldnormal))")
            };
            p.f(format_args!(
                "  v_texcoord = vec3(u_uvscaleoffset.xy * vec2(1.0 + {}, 1.0 + {}) * 0.5, 1.0);\n",
                factor(ls0),
                factor(ls1)
            ));
        }
    }
}
