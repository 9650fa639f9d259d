use super::*;

const NO_EXTENSIONS: &[&str] = &[];

fn vertex_writer<'a>(out: &'a mut String, lang: &'a DialectDescriptor) -> ShaderWriter<'a> {
    ShaderWriter::new(out, lang, ShaderStage::Vertex, NO_EXTENSIONS)
}

const COLOR: VaryingDef = VaryingDef {
    type_name: "vec4",
    name: "v_color0",
    semantic: Semantic::Color0,
    index: 1,
    precision: Some("lowp"),
    flat: true,
};

const POSITION: InputDef = InputDef {
    type_name: "vec3",
    name: "position",
    semantic: Semantic::Position,
};

#[test]
fn test_write_primitives_append() {
    let lang = DialectDescriptor::preset(ShaderLanguage::HlslD3d11);
    let mut out = String::new();
    let mut p = vertex_writer(&mut out, &lang);
    let start = p.len();
    p.c("a").w(&String::from("b")).f(format_args!("{}{}", 'c', 1));
    assert_eq!(&p.as_str()[start..], "abc1");
}

#[test]
fn test_writer_appends_after_existing_text() {
    let lang = DialectDescriptor::default();
    let mut out = String::from("// header\n");
    let p = vertex_writer(&mut out, &lang);
    assert!(p.as_str().starts_with("#version 330\n"));
    drop(p);
    assert!(out.starts_with("// header\n#version 330\n"));
}

#[test]
fn test_rewind_stops_at_writer_start() {
    let lang = DialectDescriptor::preset(ShaderLanguage::HlslD3d9);
    let mut out = String::from("keep");
    let mut p = vertex_writer(&mut out, &lang);
    p.c("x, ").rewind(2);
    assert!(p.as_str().ends_with('x'));
    let len = p.len();
    p.rewind(len + 100);
    assert!(p.is_empty());
    drop(p);
    assert_eq!(out, "keep");
}

#[test]
fn test_glsl_vertex_scaffolding() {
    let lang = DialectDescriptor::preset(ShaderLanguage::EmbeddedGlsl);
    let mut out = String::new();
    let mut p = vertex_writer(&mut out, &lang);
    p.begin_vs_main(&[POSITION], &[UniformDef::new("mat4", "u_proj")], &[COLOR]);
    p.end_vs_main(&[COLOR]);
    let src = p.as_str();
    assert!(src.contains("in vec3 position;\n"));
    assert!(src.contains("uniform mat4 u_proj;\n"));
    assert!(src.contains("flat out lowp vec4 v_color0;\n"));
    assert!(src.ends_with("\nvoid main() {\n}\n"));
}

#[test]
fn test_vulkan_uniform_block_and_locations() {
    let lang = DialectDescriptor::preset(ShaderLanguage::GlslVulkan);
    let mut out = String::new();
    let mut p = vertex_writer(&mut out, &lang);
    p.begin_vs_main(
        &[POSITION],
        &[UniformDef::array("vec3", "u_lightpos", 4)],
        &[COLOR],
    );
    let src = p.as_str();
    assert!(src.contains("layout(location = 0) in vec3 position;\n"));
    assert!(src.contains("layout(std140, set = 0, binding = 0) uniform base {\n  vec3 u_lightpos[4];\n};\n"));
    assert!(src.contains("layout(location = 1) flat out lowp vec4 v_color0;\n"));
}

#[test]
fn test_hlsl_vertex_output_struct() {
    let lang = DialectDescriptor::preset(ShaderLanguage::HlslD3d9);
    let mut out = String::new();
    let mut p = vertex_writer(&mut out, &lang);
    p.begin_vs_main(&[POSITION], &[], &[COLOR]);
    p.c("  gl_Position = vec4(position, 1.0);\n");
    p.end_vs_main(&[COLOR]);
    let src = p.as_str();
    // No flat interpolation on shader model 3
    assert!(src.contains("struct VS_OUTPUT {\n  vec4 v_color0 : COLOR0;\n  vec4 pos : POSITION;\n};\n"));
    assert!(src.contains("VS_OUTPUT main(in vec3 position : POSITION) {\n"));
    assert!(src.contains("  vs_out.v_color0 = v_color0;\n"));
    assert!(src.ends_with("  return vs_out;\n}\n"));
}

#[test]
fn test_hlsl_fragment_scaffolding() {
    let lang = DialectDescriptor::preset(ShaderLanguage::HlslD3d11);
    let mut out = String::new();
    let mut p = ShaderWriter::new(&mut out, &lang, ShaderStage::Fragment, NO_EXTENSIONS);
    p.begin_fs_main(&[UniformDef::new("vec4", "u_tint")], &[COLOR]);
    p.end_fs_main("v_color0");
    let src = p.as_str();
    assert!(src.contains("cbuffer base : register(b0) {\n  vec4 u_tint;\n};\n"));
    assert!(src.contains("vec4 target : SV_Target0;"));
    assert!(src.contains("PS_OUT main(in nointerpolation vec4 v_color0 : COLOR0) {\n"));
    assert!(src.ends_with("  ps_out.target = v_color0;\n  return ps_out;\n}\n"));
}

#[test]
fn test_legacy_glsl_fragment_output() {
    let lang = DialectDescriptor::gles2();
    let mut out = String::new();
    let mut p = ShaderWriter::new(&mut out, &lang, ShaderStage::Fragment, NO_EXTENSIONS);
    p.declare_samplers(&[SamplerDef { name: "tex", binding: 0 }]);
    p.begin_fs_main(&[], &[COLOR]);
    p.c("  vec4 t = ").sample_texture_2d("tex", "vec2(0.5)").c(";\n");
    p.end_fs_main("t");
    let src = p.as_str();
    assert!(src.contains("uniform sampler2D tex;\n"));
    assert!(src.contains("varying lowp vec4 v_color0;\n"));
    assert!(!src.contains("out vec4 fragColor0"));
    assert!(src.contains("vec4 t = texture2D(tex, vec2(0.5));"));
    assert!(src.contains("gl_FragColor = t;"));
}

#[test]
fn test_d3d9_samplers() {
    let lang = DialectDescriptor::preset(ShaderLanguage::HlslD3d9);
    let mut out = String::new();
    let mut p = ShaderWriter::new(&mut out, &lang, ShaderStage::Fragment, NO_EXTENSIONS);
    p.declare_samplers(&[SamplerDef { name: "tex", binding: 1 }]);
    p.sample_texture_2d("tex", "uv");
    assert!(p.as_str().contains("sampler tex : register(s1);\ntex2D(tex, uv)"));
}

#[test]
fn test_precision_helpers_only_on_embedded() {
    let es = DialectDescriptor::preset(ShaderLanguage::EmbeddedGlsl);
    let mut out = String::new();
    let mut p = vertex_writer(&mut out, &es);
    let start = p.len();
    p.high_precision_float();
    assert_eq!(&p.as_str()[start..], "precision highp float;\n");

    let desktop = DialectDescriptor::default();
    let mut out = String::new();
    let mut p = vertex_writer(&mut out, &desktop);
    let start = p.len();
    p.high_precision_float();
    assert_eq!(p.len(), start);
}

#[test]
fn test_uniform_register_counts() {
    assert_eq!(UniformDef::new("mat4", "m").register_count(), 4);
    assert_eq!(UniformDef::new("mat3x4", "m").register_count(), 3);
    assert_eq!(UniformDef::array("vec3", "v", 4).register_count(), 4);
}
