//! Color format reinterpretation.
//!
//! The generated code is checked against a CPU model of the same pack and
//! unpack, driven by the same channel tables.

use ge_shadergen::fragment::{write_reinterpret_body, write_reinterpret_shader};
use ge_shadergen::ge_constants::ChannelLayout;
use ge_shadergen::{
    DialectDescriptor, PixelFormat, ShaderGenError, ShaderLanguage, ShaderStage, ShaderWriter,
    generate_reinterpret_shader,
};

const NO_EXTENSIONS: &[&str] = &[];

/// Largest acceptable reinterpret program
const REINTERPRET_SOURCE_LIMIT: usize = 8192;

fn pack(color: [f32; 4], format: PixelFormat) -> u32 {
    format.channels().iter().fold(0, |word, channel| {
        let value = color[lane(channel)];
        let bits = if channel.bits == 1 {
            u32::from(value >= 0.5)
        } else {
            (value * (channel.mask() as f32 + 0.99)) as u32
        };
        word | (bits << channel.shift)
    })
}

fn unpack(word: u32, format: PixelFormat) -> [f32; 4] {
    let mut color = [0.0, 0.0, 0.0, 1.0];
    for channel in format.channels() {
        let raw = (word >> channel.shift) & channel.mask();
        color[lane(channel)] = raw as f32 / channel.mask() as f32;
    }
    color
}

fn lane(channel: &ChannelLayout) -> usize {
    match channel.name {
        'r' => 0,
        'g' => 1,
        'b' => 2,
        _ => 3,
    }
}

#[test]
fn packing_stays_within_one_quantization_step() {
    let samples = [0.0, 0.03, 0.25, 0.5, 0.51, 0.75, 0.97, 1.0];
    for format in PixelFormat::PACKED_16BIT {
        for &v in &samples {
            let color = [v, 1.0 - v, v * 0.5, v];
            let word = pack(color, format);
            assert!(word <= 0xFFFF);
            let back = unpack(word, format);
            for channel in format.channels() {
                let i = lane(channel);
                let step = 1.0 / channel.mask() as f32;
                assert!(
                    (back[i] - color[i]).abs() <= step + f32::EPSILON,
                    "{} channel {} {} -> {}",
                    format,
                    channel.name,
                    color[i],
                    back[i]
                );
            }
        }
        // A plain x15/x31/x63 scale would truncate 0.999 one level below white
        assert_eq!(pack([1.0; 4], format), pack([0.999; 4], format));
    }
}

#[test]
fn generated_code_matches_model_constants() {
    let lang = DialectDescriptor::default();
    for from in PixelFormat::PACKED_16BIT {
        for to in PixelFormat::PACKED_16BIT {
            let shader = generate_reinterpret_shader(from, to, &lang).unwrap();
            for channel in from.channels().iter().filter(|c| c.bits > 1) {
                let term = format!("uint(val.{} * {}.99)", channel.name, channel.mask());
                assert!(shader.source.contains(&term), "{} -> {} missing {}", from, to, term);
            }
            for channel in to.channels() {
                let mask = format!("0x{:X}u", channel.mask());
                assert!(shader.source.contains(&mask), "{} -> {} missing {}", from, to, mask);
            }
            if !to.channels().iter().any(|c| c.name == 'a') {
                assert!(shader.source.contains(", 1.0);"));
            }
        }
    }
}

#[test]
fn every_pair_fits_for_bitwise_dialects() {
    for lang in ShaderLanguage::ALL.into_iter().map(DialectDescriptor::preset) {
        for from in PixelFormat::PACKED_16BIT {
            for to in PixelFormat::PACKED_16BIT {
                if from == to {
                    continue;
                }
                let result = generate_reinterpret_shader(from, to, &lang);
                if !lang.has_bitwise_integer_ops {
                    assert!(matches!(result, Err(ShaderGenError::UnsupportedConversion { .. })));
                    continue;
                }
                let shader = result.unwrap();
                assert_eq!(shader.stage, ShaderStage::Fragment);
                assert!(shader.len() < REINTERPRET_SOURCE_LIMIT, "{} {} -> {}", lang, from, to);
            }
        }
    }
}

#[test]
fn no_bitwise_ops_is_unsupported_and_writes_nothing() {
    let mut lang = DialectDescriptor::preset(ShaderLanguage::DesktopGlsl);
    lang.has_bitwise_integer_ops = false;

    let mut out = String::from("// untouched\n");
    let err = write_reinterpret_shader(&mut out, PixelFormat::Rgba5551, PixelFormat::Rgb565, &lang, NO_EXTENSIONS)
        .unwrap_err();
    assert_eq!(
        err,
        ShaderGenError::UnsupportedConversion {
            from: PixelFormat::Rgba5551,
            to: PixelFormat::Rgb565,
            language: ShaderLanguage::DesktopGlsl,
        }
    );
    assert_eq!(out, "// untouched\n");

    let mut out = String::new();
    let mut p = ShaderWriter::new(&mut out, &lang, ShaderStage::Fragment, NO_EXTENSIONS);
    let before = p.as_str().to_string();
    assert!(write_reinterpret_body(&mut p, PixelFormat::Rgba5551, PixelFormat::Rgb565).is_err());
    assert_eq!(p.as_str(), before);
}

#[test]
fn body_closes_the_entry_point() {
    let lang = DialectDescriptor::preset(ShaderLanguage::HlslD3d11);
    let shader = generate_reinterpret_shader(PixelFormat::Rgba4444, PixelFormat::Rgba5551, &lang).unwrap();
    assert!(shader.source.ends_with("  ps_out.target = outColor;\n  return ps_out;\n}\n"));
    assert_eq!(shader.source.matches('{').count(), shader.source.matches('}').count());
}

#[test]
fn rgba8888_is_not_a_reinterpret_endpoint() {
    let lang = DialectDescriptor::default();
    assert_eq!(
        generate_reinterpret_shader(PixelFormat::Rgba8888, PixelFormat::Rgb565, &lang).unwrap_err(),
        ShaderGenError::InvalidPixelFormat(PixelFormat::Rgba8888)
    );
}
