//! Per-vertex lighting clause.
//!
//! Emits the statement sequence that accumulates the lit vertex color into
//! `lightSum0` (ambient, emissive and diffuse) and `lightSum1` (specular). The
//! enclosing vertex program must already have `worldpos`, `worldnormal` and,
//! when tessellating, `tess` in scope, and must declare the light uniforms the
//! clause references.
//!
//! Only fully computed lights produce code, and only the code their type and
//! computation mode need: directional lights never touch `distance` or
//! `lightScale`, and a slot without specular never touches `lightSum1`.

use crate::dialect::DialectDescriptor;
use crate::ge_constants::{LightComputation, LightType, TessellationMode, UvGenMode};
use crate::key::{NUM_LIGHTS, VShaderId};
use crate::writer::ShaderWriter;

/// How much of a light slot the vertex program evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoLightComputation {
    Off,
    /// Position only, as a shade-mapping source
    Shade,
    Full,
}

/// What the emitted lighting clause turned out to need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightingOutput {
    /// No light contributes diffuse, so no `diffuse`/`toLight` scratch exists
    pub diffuse_is_zero: bool,
    /// No light contributes specular; `lightSum1` was not declared
    pub specular_is_zero: bool,
}

/// Classify each slot from the key.
///
/// Shade-mapping sources are marked `Shade`; an enabled light under active
/// lighting is upgraded to `Full`. Software-transformed vertices arrive lit,
/// so every slot is `Off` for them.
pub fn resolve_light_computations(id: VShaderId) -> [DoLightComputation; NUM_LIGHTS] {
    let mut do_light = [DoLightComputation::Off; NUM_LIGHTS];
    if !id.use_hw_transform() {
        return do_light;
    }
    let shade_sources = (id.uv_gen_mode() == UvGenMode::EnvironmentMap).then(|| id.shade_light_sources());
    for (i, slot) in do_light.iter_mut().enumerate() {
        if let Some((ls0, ls1)) = shade_sources {
            if i == ls0 || i == ls1 {
                *slot = DoLightComputation::Shade;
            }
        }
        if id.lighting_enabled() && id.light(i).is_enabled() {
            *slot = DoLightComputation::Full;
        }
    }
    do_light
}

/// Suffix selecting light `i` from a light uniform: `[i]` when the dialect
/// declares light uniforms as arrays, `i` when they are separate uniforms
pub fn light_uniform_suffix(lang: &DialectDescriptor, i: usize) -> String {
    if lang.uses_uniform_indexing() {
        format!("[{}]", i)
    } else {
        i.to_string()
    }
}

/// Emit the material color selection and, with lighting enabled, the light
/// accumulation.
///
/// `ambientColor` is always declared since the unlit path needs it too.
pub fn write_lighting(
    p: &mut ShaderWriter<'_>,
    id: VShaderId,
    do_light: &[DoLightComputation; NUM_LIGHTS],
) -> LightingOutput {
    let lang = p.lang();
    let lighting = id.lighting_enabled();
    let has_color = id.has_color();
    let update = id.material_update();
    let src_col = if id.tessellation() == TessellationMode::None {
        "color0"
    } else {
        "tess.col"
    };
    let pick = |from_vertex: bool, uniform: &'static str| {
        if from_vertex && has_color { src_col } else { uniform }
    };

    p.f(format_args!(
        "  vec4 ambientColor = {};\n",
        pick(update.ambient, "u_matambientalpha")
    ));
    if !lighting {
        return LightingOutput {
            diffuse_is_zero: true,
            specular_is_zero: true,
        };
    }
    p.f(format_args!(
        "  vec3 diffuseColor = {}.rgb;\n",
        pick(update.diffuse, "u_matdiffuse")
    ));
    p.f(format_args!(
        "  vec3 specularColor = {}.rgb;\n",
        pick(update.specular, "u_matspecular")
    ));

    let full_lights: Vec<usize> = (0..NUM_LIGHTS)
        .filter(|&i| do_light[i] == DoLightComputation::Full)
        .collect();
    let diffuse_is_zero = full_lights.is_empty();
    let specular_is_zero = !full_lights
        .iter()
        .any(|&i| id.light(i).computation == LightComputation::DiffuseAndSpecular);
    let distance_needed = full_lights
        .iter()
        .any(|&i| id.light(i).light_type != LightType::Directional);
    let any_spots = full_lights
        .iter()
        .any(|&i| id.light(i).light_type.is_spot_like());

    p.c("  lowp vec4 lightSum0 = u_ambient * ambientColor + vec4(u_matemissive, 0.0);\n");
    if !specular_is_zero {
        p.c("  lowp vec3 lightSum1 = splat3(0.0);\n");
    }
    if !diffuse_is_zero {
        p.c("  vec3 toLight;\n");
        p.c("  lowp vec3 diffuse;\n");
    }
    if distance_needed {
        p.c("  float distance;\n");
        p.c("  lowp float lightScale;\n");
    }
    p.c("  mediump float ldot;\n");
    if any_spots {
        p.c("  lowp float angle;\n");
    }

    for &i in &full_lights {
        let slot = id.light(i);
        let n = light_uniform_suffix(lang, i);
        write_light(p, &n, slot.light_type, slot.computation);
    }

    tracing::trace!(
        lights = full_lights.len(),
        specular_is_zero,
        "Emitted lighting clause"
    );
    LightingOutput {
        diffuse_is_zero,
        specular_is_zero,
    }
}

fn write_light(p: &mut ShaderWriter<'_>, n: &str, light_type: LightType, computation: LightComputation) {
    if light_type == LightType::Directional {
        // Directional light positions arrive normalized
        p.f(format_args!("  toLight = u_lightpos{};\n", n));
    } else {
        p.f(format_args!("  toLight = u_lightpos{} - worldpos;\n", n));
        p.c("  distance = length(toLight);\n");
        p.c("  toLight /= distance;\n");
    }

    p.c("  ldot = dot(toLight, worldnormal);\n");
    if computation == LightComputation::PoweredDiffuseOnly {
        // Hardware treats pow(x, 0.0) as 1.0, including x == 0.0
        p.c("  if (u_matspecular.a > 0.0) {\n");
        p.c("    ldot = pow(max(ldot, 0.0), u_matspecular.a);\n");
        p.c("  } else {\n");
        p.c("    ldot = 1.0;\n");
        p.c("  }\n");
    }

    let times_light_scale = match light_type {
        LightType::Directional => "",
        LightType::Point => {
            p.f(format_args!(
                "  lightScale = clamp(1.0 / dot(u_lightatt{}, vec3(1.0, distance, distance*distance)), 0.0, 1.0);\n",
                n
            ));
            " * lightScale"
        }
        LightType::Spot | LightType::Unknown => {
            p.f(format_args!(
                "  angle = length(u_lightdir{n}) == 0.0 ? 0.0 : dot(normalize(u_lightdir{n}), toLight);\n"
            ));
            p.f(format_args!("  if (angle >= u_lightangle_spotCoef{}.x) {{\n", n));
            p.f(format_args!(
                "    lightScale = clamp(1.0 / dot(u_lightatt{n}, vec3(1.0, distance, distance*distance)), 0.0, 1.0) * (u_lightangle_spotCoef{n}.y <= 0.0 ? 1.0 : pow(angle, u_lightangle_spotCoef{n}.y));\n"
            ));
            p.c("  } else {\n");
            p.c("    lightScale = 0.0;\n");
            p.c("  }\n");
            " * lightScale"
        }
    };

    p.f(format_args!(
        "  diffuse = (u_lightdiffuse{} * diffuseColor) * max(ldot, 0.0);\n",
        n
    ));
    if computation == LightComputation::DiffuseAndSpecular {
        // View vector is approximated as +Z
        p.c("  if (ldot >= 0.0) {\n");
        p.c("    if (u_matspecular.a > 0.0) {\n");
        p.c("      ldot = dot(normalize(toLight + vec3(0.0, 0.0, 1.0)), worldnormal);\n");
        p.c("      ldot = pow(max(ldot, 0.0), u_matspecular.a);\n");
        p.c("    } else {\n");
        p.c("      ldot = 1.0;\n");
        p.c("    }\n");
        p.c("    if (ldot > 0.0)\n");
        p.f(format_args!(
            "      lightSum1 += u_lightspecular{} * specularColor * ldot{};\n",
            n, times_light_scale
        ));
        p.c("  }\n");
    }
    p.f(format_args!(
        "  lightSum0.rgb += (u_lightambient{} * ambientColor.rgb + diffuse){};\n",
        n, times_light_scale
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::ShaderLanguage;
    use crate::ge_constants::MaterialUpdate;
    use crate::key::LightSlot;
    use crate::writer::ShaderStage;

    fn emit(id: VShaderId, lang: &DialectDescriptor) -> (String, LightingOutput) {
        let mut out = String::new();
        let mut p = ShaderWriter::new(&mut out, lang, ShaderStage::Vertex, &[] as &[&str]);
        let start = p.len();
        let result = write_lighting(&mut p, id, &resolve_light_computations(id));
        let body = p.as_str()[start..].to_string();
        (body, result)
    }

    fn lit(slot: LightSlot) -> VShaderId {
        VShaderId::new()
            .with_hw_transform(true)
            .with_normal(true)
            .with_lighting(true)
            .with_light(0, slot)
    }

    #[test]
    fn shade_sources_only_with_environment_map() {
        let id = VShaderId::new()
            .with_hw_transform(true)
            .with_uv_gen_mode(UvGenMode::EnvironmentMap)
            .with_shade_light_sources(1, 3);
        assert_eq!(
            resolve_light_computations(id),
            [
                DoLightComputation::Off,
                DoLightComputation::Shade,
                DoLightComputation::Off,
                DoLightComputation::Shade
            ]
        );

        let id = id.with_uv_gen_mode(UvGenMode::TextureCoords);
        assert_eq!(resolve_light_computations(id), [DoLightComputation::Off; NUM_LIGHTS]);
    }

    #[test]
    fn full_lights_need_lighting_and_hw_transform() {
        let slot = LightSlot::new(LightType::Point, LightComputation::DiffuseOnly);
        let id = lit(slot).with_uv_gen_mode(UvGenMode::EnvironmentMap);
        assert_eq!(resolve_light_computations(id)[0], DoLightComputation::Full);

        assert_eq!(
            resolve_light_computations(id.with_lighting(false))[0],
            DoLightComputation::Shade
        );
        assert_eq!(
            resolve_light_computations(id.with_hw_transform(false))[0],
            DoLightComputation::Off
        );
    }

    #[test]
    fn unlit_key_only_selects_ambient() {
        let lang = DialectDescriptor::default();
        let id = VShaderId::new().with_hw_transform(true).with_color(true);
        let (body, result) = emit(id, &lang);
        assert_eq!(body, "  vec4 ambientColor = u_matambientalpha;\n");
        assert!(result.specular_is_zero && result.diffuse_is_zero);
    }

    #[test]
    fn material_update_needs_vertex_color() {
        let lang = DialectDescriptor::default();
        let update = MaterialUpdate::from_bits(0b111);
        let slot = LightSlot::new(LightType::Directional, LightComputation::DiffuseOnly);

        let (body, _) = emit(lit(slot).with_material_update(update).with_color(true), &lang);
        assert!(body.contains("vec4 ambientColor = color0;"));
        assert!(body.contains("vec3 diffuseColor = color0.rgb;"));
        assert!(body.contains("vec3 specularColor = color0.rgb;"));

        let (body, _) = emit(lit(slot).with_material_update(update), &lang);
        assert!(body.contains("vec4 ambientColor = u_matambientalpha;"));
        assert!(body.contains("vec3 diffuseColor = u_matdiffuse.rgb;"));
    }

    #[test]
    fn tessellated_color_source() {
        let lang = DialectDescriptor::default();
        let slot = LightSlot::new(LightType::Directional, LightComputation::DiffuseOnly);
        let id = lit(slot)
            .with_color(true)
            .with_tessellation(TessellationMode::Spline)
            .with_material_update(MaterialUpdate::from_bits(2));
        let (body, _) = emit(id, &lang);
        assert!(body.contains("vec4 ambientColor = u_matambientalpha;"));
        assert!(body.contains("vec3 diffuseColor = tess.col.rgb;"));
    }

    #[test]
    fn spot_light_guards_zero_direction_and_falloff() {
        let lang = DialectDescriptor::default();
        let (body, result) = emit(lit(LightSlot::new(LightType::Spot, LightComputation::DiffuseOnly)), &lang);
        assert!(body.contains("  lowp float angle;\n"));
        assert!(body.contains(
            "angle = length(u_lightdir0) == 0.0 ? 0.0 : dot(normalize(u_lightdir0), toLight);"
        ));
        assert!(body.contains("(u_lightangle_spotCoef0.y <= 0.0 ? 1.0 : pow(angle, u_lightangle_spotCoef0.y))"));
        assert!(body.contains("lightSum0.rgb += (u_lightambient0 * ambientColor.rgb + diffuse) * lightScale;"));
        assert!(result.specular_is_zero);
        assert!(!body.contains("lightSum1"));
    }

    #[test]
    fn indexed_uniforms_on_vulkan() {
        let lang = DialectDescriptor::preset(ShaderLanguage::GlslVulkan);
        let id = VShaderId::new()
            .with_hw_transform(true)
            .with_lighting(true)
            .with_light(2, LightSlot::new(LightType::Point, LightComputation::DiffuseAndSpecular));
        let (body, result) = emit(id, &lang);
        assert!(body.contains("toLight = u_lightpos[2] - worldpos;"));
        assert!(body.contains("lightSum1 += u_lightspecular[2] * specularColor * ldot * lightScale;"));
        assert!(!result.specular_is_zero);
    }

    #[test]
    fn lights_emitted_in_slot_order() {
        let lang = DialectDescriptor::default();
        let id = VShaderId::new()
            .with_hw_transform(true)
            .with_lighting(true)
            .with_light(3, LightSlot::new(LightType::Point, LightComputation::DiffuseOnly))
            .with_light(1, LightSlot::new(LightType::Directional, LightComputation::DiffuseOnly));
        let (body, _) = emit(id, &lang);
        let first = body.find("u_lightpos1").unwrap();
        let second = body.find("u_lightpos3").unwrap();
        assert!(first < second);
        assert!(!body.contains("u_lightpos0"));
        assert!(!body.contains("u_lightpos2"));
    }
}
