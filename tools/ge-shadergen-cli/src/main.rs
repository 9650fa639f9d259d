//! ge-shadergen - generate and inspect GE shader sources
//!
//! # Commands
//!
//! - `ge-shadergen vertex` - Vertex program (and optionally its color fragment program) for a key
//! - `ge-shadergen reinterpret` - Color format reinterpret fragment program
//! - `ge-shadergen describe` - Decode a vertex key into its fields
//! - `ge-shadergen sweep` - Generate every reinterpret pair for every dialect and report sizes
//!
//! # Usage
//!
//! ```bash
//! # Hardware-transformed key with one directional light, for GLSL ES
//! ge-shadergen vertex --key 0x0110000000000300 --dialect embedded-glsl
//!
//! # Same thing, key written out field by field
//! ge-shadergen vertex --key-file key.toml --dialect-config gles3.toml
//!
//! # 5551 framebuffer read back as 565
//! ge-shadergen reinterpret --from 5551 --to 565 --dialect hlsl-d3d11
//! ```
//!
//! # Key file (key.toml)
//!
//! ```toml
//! hardware_transform = true
//! has_normal = true
//! lighting = true
//!
//! [[lights]]
//! type = "directional"
//! computation = "diffuse-and-specular"
//! ```

mod args;
mod describe;
mod reinterpret;
mod sweep;
mod vertex;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// ge-shadergen - GE pipeline state to shader source compiler
#[derive(Parser)]
#[command(name = "ge-shadergen")]
#[command(about = "Generate shader sources from GE pipeline state keys")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the vertex program for a key
    Vertex(vertex::VertexArgs),

    /// Generate a color format reinterpret fragment program
    Reinterpret(reinterpret::ReinterpretArgs),

    /// Print the fields packed into a vertex key
    Describe(describe::DescribeArgs),

    /// Generate every reinterpret pair for every dialect
    Sweep(sweep::SweepArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Vertex(args) => vertex::execute(args),
        Commands::Reinterpret(args) => reinterpret::execute(args),
        Commands::Describe(args) => describe::execute(args),
        Commands::Sweep(args) => sweep::execute(args),
    }
}
