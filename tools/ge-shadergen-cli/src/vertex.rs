//! Vertex command - generate the vertex program for a key

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::args::{DialectArgs, KeyArgs, emit};

/// Arguments for the vertex command
#[derive(Args)]
pub struct VertexArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    #[command(flatten)]
    pub dialect: DialectArgs,

    /// Write the vertex program here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the matching color fragment program to this path
    #[arg(long)]
    pub fragment: Option<PathBuf>,
}

/// Execute the vertex command
pub fn execute(args: VertexArgs) -> Result<()> {
    let id = args.key.resolve()?;
    let compiler = args.dialect.compiler()?;

    let (shader, flags) = compiler
        .vertex_shader(id)
        .with_context(|| format!("Failed to generate vertex shader for {}", id))?;
    emit(&shader, args.output.as_deref())?;

    if let Some(path) = &args.fragment {
        let fragment = compiler.color_fragment_shader(&flags);
        emit(&fragment, Some(path))?;
    }
    Ok(())
}
