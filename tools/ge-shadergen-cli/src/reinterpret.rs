//! Reinterpret command - generate a color format reinterpret fragment program

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ge_shadergen::PixelFormat;

use crate::args::{DialectArgs, emit};

/// Arguments for the reinterpret command
#[derive(Args)]
pub struct ReinterpretArgs {
    /// Format the texture was rendered in (565, 5551, 4444)
    #[arg(long)]
    pub from: String,

    /// Format to read it back as
    #[arg(long)]
    pub to: String,

    #[command(flatten)]
    pub dialect: DialectArgs,

    /// Write the program here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the reinterpret command
pub fn execute(args: ReinterpretArgs) -> Result<()> {
    let from: PixelFormat = args.from.parse()?;
    let to: PixelFormat = args.to.parse()?;
    let compiler = args.dialect.compiler()?;

    let shader = compiler
        .reinterpret_shader(from, to)
        .with_context(|| format!("Failed to generate {} -> {} reinterpret shader", from, to))?;
    emit(&shader, args.output.as_deref())
}
