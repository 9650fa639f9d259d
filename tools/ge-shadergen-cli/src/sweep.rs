//! Sweep command - generate every reinterpret pair for every dialect
//!
//! Reports the size and fingerprint of each program and fails when one is
//! over the size limit.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ge_shadergen::{DialectDescriptor, PixelFormat, ShaderGenError, ShaderLanguage, ShaderSourceCompiler};
use serde::Serialize;

/// Arguments for the sweep command
#[derive(Args)]
pub struct SweepArgs {
    /// Largest acceptable program, in bytes
    #[arg(long, default_value_t = 8192)]
    pub limit: usize,

    /// Write the report as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SweepEntry {
    dialect: String,
    from: PixelFormat,
    to: PixelFormat,
    /// Absent when the dialect cannot express the conversion
    bytes: Option<usize>,
    fingerprint: Option<String>,
    skipped: Option<String>,
}

/// Execute the sweep command
pub fn execute(args: SweepArgs) -> Result<()> {
    let entries = sweep()?;

    for entry in &entries {
        match (entry.bytes, &entry.fingerprint) {
            (Some(bytes), Some(fingerprint)) => println!(
                "{:<20} {:>4} -> {:<4} {:>6} bytes  {}",
                entry.dialect, entry.from, entry.to, bytes, fingerprint
            ),
            _ => println!(
                "{:<20} {:>4} -> {:<4} skipped: {}",
                entry.dialect,
                entry.from,
                entry.to,
                entry.skipped.as_deref().unwrap_or("")
            ),
        }
    }

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    let oversized: Vec<&SweepEntry> = entries
        .iter()
        .filter(|e| e.bytes.is_some_and(|bytes| bytes >= args.limit))
        .collect();
    if !oversized.is_empty() {
        for entry in &oversized {
            tracing::error!("{} {} -> {} is {:?} bytes", entry.dialect, entry.from, entry.to, entry.bytes);
        }
        anyhow::bail!("{} programs are {} bytes or larger", oversized.len(), args.limit);
    }
    Ok(())
}

fn dialects() -> Vec<DialectDescriptor> {
    let mut dialects: Vec<_> = ShaderLanguage::ALL.into_iter().map(DialectDescriptor::preset).collect();
    dialects.push(DialectDescriptor::gles2());
    dialects
}

fn sweep() -> Result<Vec<SweepEntry>> {
    let mut entries = Vec::new();
    for dialect in dialects() {
        let name = dialect.to_string();
        let compiler = ShaderSourceCompiler::new(dialect);
        for from in PixelFormat::PACKED_16BIT {
            for to in PixelFormat::PACKED_16BIT {
                if from == to {
                    continue;
                }
                let mut entry = SweepEntry {
                    dialect: name.clone(),
                    from,
                    to,
                    bytes: None,
                    fingerprint: None,
                    skipped: None,
                };
                match compiler.reinterpret_shader(from, to) {
                    Ok(shader) => {
                        entry.bytes = Some(shader.len());
                        entry.fingerprint = Some(format!("{:016x}", shader.fingerprint()));
                    }
                    Err(err @ ShaderGenError::UnsupportedConversion { .. }) => {
                        entry.skipped = Some(err.to_string());
                    }
                    Err(err) => return Err(err.into()),
                }
                entries.push(entry);
            }
        }
    }
    Ok(entries)
}
