//! Fragment program generation.
//!
//! The reinterpret body reads `val`, the color as it was rendered in the
//! source format, packs it to the 16-bit word that format stores, and expands
//! that word as the destination format. It is built from the channel tables in
//! `ge_constants`, so every packed format shares one code path.

use crate::ShaderGenError;
use crate::dialect::DialectDescriptor;
use crate::ge_constants::{ChannelLayout, PixelFormat};
use crate::vertex::{VertexShaderFlags, color_varyings};
use crate::writer::{SamplerDef, Semantic, ShaderStage, ShaderWriter, VaryingDef};

const REINTERPRET_TEXCOORD: VaryingDef = VaryingDef {
    type_name: "vec2",
    name: "v_texcoord",
    semantic: Semantic::TexCoord0,
    index: 0,
    precision: Some("highp"),
    flat: false,
};

const SOURCE_TEXTURE: SamplerDef = SamplerDef {
    name: "tex",
    binding: 0,
};

/// Fail unless `from` -> `to` can be expressed in `lang`
pub fn check_reinterpret(
    lang: &DialectDescriptor,
    from: PixelFormat,
    to: PixelFormat,
) -> Result<(), ShaderGenError> {
    if let Some(fmt) = [from, to].into_iter().find(|fmt| !fmt.is_16bit()) {
        return Err(ShaderGenError::InvalidPixelFormat(fmt));
    }
    if !lang.has_bitwise_integer_ops {
        tracing::warn!(
            "Reinterpret {} -> {} requested on {}, which lacks bitwise integer ops",
            from,
            to,
            lang
        );
        return Err(ShaderGenError::UnsupportedConversion {
            from,
            to,
            language: lang.shading_language,
        });
    }
    Ok(())
}

/// Scale that maps 1.0 just below the channel's top value plus one, so
/// truncation lands on the intended integer
fn pack_scale(channel: &ChannelLayout) -> String {
    format!("{}.99", channel.mask())
}

fn pack_expression(from: PixelFormat) -> String {
    from.channels()
        .iter()
        .filter(|channel| channel.bits > 1)
        .map(|channel| {
            let value = format!("uint(val.{} * {})", channel.name, pack_scale(channel));
            if channel.shift == 0 {
                value
            } else {
                format!("({} << 0x{:X}u)", value, channel.shift)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn unpack_channel(channel: Option<&ChannelLayout>) -> String {
    match channel {
        None => "1.0".to_string(),
        Some(channel) if channel.shift == 0 => {
            format!("float(color & 0x{:X}u)", channel.mask())
        }
        Some(channel) => format!(
            "float((color >> 0x{:X}u) & 0x{:X}u)",
            channel.shift,
            channel.mask()
        ),
    }
}

/// Emit pack/unpack code and close the entry point.
///
/// Expects a `vec4 val` in scope. Nothing is written on failure.
pub fn write_reinterpret_body(
    p: &mut ShaderWriter<'_>,
    from: PixelFormat,
    to: PixelFormat,
) -> Result<(), ShaderGenError> {
    check_reinterpret(p.lang(), from, to)?;

    p.f(format_args!("  uint color = {};\n", pack_expression(from)));
    // One-bit channels are a threshold, not a scaled value
    for channel in from.channels().iter().filter(|channel| channel.bits == 1) {
        p.f(format_args!(
            "  if (val.{} >= 0.5) color |= 0x{:X}u;\n",
            channel.name,
            1u32 << channel.shift
        ));
    }

    let dest = to.channels();
    let lanes: Vec<String> = ['r', 'g', 'b', 'a']
        .into_iter()
        .map(|name| unpack_channel(dest.iter().find(|channel| channel.name == name)))
        .collect();
    p.f(format_args!("  vec4 outColor = vec4({});\n", lanes.join(", ")));

    // Renormalize, grouping channels of equal width into one swizzle
    let mut widths: Vec<u32> = dest
        .iter()
        .map(|channel| channel.bits)
        .filter(|&bits| bits > 1)
        .collect();
    widths.sort_unstable();
    widths.dedup();
    for bits in widths {
        let swizzle: String = dest
            .iter()
            .filter(|channel| channel.bits == bits)
            .map(|channel| channel.name)
            .collect();
        p.f(format_args!(
            "  outColor.{} *= 1.0 / {}.0;\n",
            swizzle,
            (1u32 << bits) - 1
        ));
    }
    p.end_fs_main("outColor");
    Ok(())
}

/// Write a full reinterpret fragment program into `out`.
///
/// `out` is left untouched when the conversion is not available.
pub fn write_reinterpret_shader<S: AsRef<str>>(
    out: &mut String,
    from: PixelFormat,
    to: PixelFormat,
    lang: &DialectDescriptor,
    extensions: &[S],
) -> Result<(), ShaderGenError> {
    check_reinterpret(lang, from, to)?;

    let mut p = ShaderWriter::new(out, lang, ShaderStage::Fragment, extensions);
    // Packing needs full float range; the ES preamble defaults to lowp.
    p.high_precision_float();
    p.f(format_args!("// Reinterpret {} as {}\n", from, to));
    p.declare_samplers(&[SOURCE_TEXTURE]);
    p.begin_fs_main(&[], &[REINTERPRET_TEXCOORD]);
    p.c("  vec4 val = ")
        .sample_texture_2d(SOURCE_TEXTURE.name, "v_texcoord.xy")
        .c(";\n");
    write_reinterpret_body(&mut p, from, to)?;
    tracing::trace!(bytes = p.len(), "Generated reinterpret shader");
    Ok(())
}

/// Write the fragment program that outputs the interpolated vertex color.
///
/// The secondary color is only read when the vertex program produced one.
pub fn write_color_fragment_shader<S: AsRef<str>>(
    out: &mut String,
    lang: &DialectDescriptor,
    vertex: &VertexShaderFlags,
    extensions: &[S],
) {
    let varyings = color_varyings(vertex.secondary_color, vertex.flat_shade);
    let mut p = ShaderWriter::new(out, lang, ShaderStage::Fragment, extensions);
    p.begin_fs_main(&[], &varyings);
    if vertex.secondary_color && !vertex.specular_is_zero {
        p.c("  vec4 color = clamp(v_color0 + vec4(v_color1, 0.0), 0.0, 1.0);\n");
    } else {
        p.c("  vec4 color = v_color0;\n");
    }
    p.end_fs_main("color");
    tracing::trace!(bytes = p.len(), "Generated color fragment shader");
}
