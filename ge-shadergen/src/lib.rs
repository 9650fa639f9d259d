//! GE shader source generator
//!
//! Turns a packed GE pipeline-state key into vertex program source, and
//! produces the fragment programs that go with it, for five shading dialects:
//! desktop GLSL, GLSL ES, Vulkan GLSL, and HLSL for shader model 3 and 4+.
//!
//! # Architecture
//!
//! - [`ShaderWriter`] - append-only emitter with per-dialect preambles and
//!   entry point scaffolding
//! - [`VShaderId`] - the 64-bit vertex variant key
//! - [`lighting`] - the per-vertex lighting clause
//! - [`fragment`] - color format reinterpretation and color output programs
//! - [`ShaderSourceCompiler`] - whole programs for one dialect
//!
//! Bodies are written once in a GLSL-like syntax; the preamble's macros map
//! that syntax onto each dialect.

pub mod compiler;
pub mod dialect;
mod error;
pub mod fragment;
pub mod ge_constants;
pub mod key;
pub mod lighting;
pub mod vertex;
pub mod writer;

pub use compiler::{
    GeneratedShader, ShaderSourceCompiler, generate_color_fragment_shader,
    generate_reinterpret_shader, generate_vertex_shader,
};
pub use dialect::{DialectDescriptor, ShaderLanguage};
pub use error::ShaderGenError;
pub use ge_constants::{LightComputation, LightType, MaterialUpdate, PixelFormat, TessellationMode, UvGenMode};
pub use key::{LightSlot, NUM_LIGHTS, VShaderId, VertexKeyConfig};
pub use lighting::{DoLightComputation, LightingOutput, resolve_light_computations};
pub use vertex::VertexShaderFlags;
pub use writer::{MAX_SHADER_SOURCE_LEN, ShaderStage, ShaderWriter};
