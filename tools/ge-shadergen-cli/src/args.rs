//! Arguments shared between commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use ge_shadergen::{DialectDescriptor, GeneratedShader, ShaderLanguage, ShaderSourceCompiler, VShaderId, VertexKeyConfig};

/// Target dialect selection
#[derive(Args)]
pub struct DialectArgs {
    /// Dialect preset: desktop-glsl, embedded-glsl, glsl-vulkan, hlsl-d3d9, hlsl-d3d11
    #[arg(short, long, default_value = "desktop-glsl")]
    pub dialect: String,

    /// TOML dialect description (takes precedence over --dialect)
    #[arg(long)]
    pub dialect_config: Option<PathBuf>,

    /// Driver description printed as a comment in GLSL output
    #[arg(long)]
    pub driver_info: Option<String>,

    /// Extension line inserted after the version line (repeatable)
    #[arg(short, long = "extension")]
    pub extensions: Vec<String>,
}

impl DialectArgs {
    pub fn descriptor(&self) -> Result<DialectDescriptor> {
        let mut dialect = match &self.dialect_config {
            Some(path) => DialectDescriptor::load(path)?,
            None => {
                let language: ShaderLanguage = self.dialect.parse()?;
                DialectDescriptor::preset(language)
            }
        };
        if let Some(info) = &self.driver_info {
            dialect = dialect.with_driver_info(info.clone());
        }
        Ok(dialect)
    }

    pub fn compiler(&self) -> Result<ShaderSourceCompiler> {
        let compiler = self
            .extensions
            .iter()
            .fold(ShaderSourceCompiler::new(self.descriptor()?), |compiler, ext| {
                compiler.with_extension(ext.clone())
            });
        Ok(compiler)
    }
}

/// Vertex key, given as text or as a TOML field list
#[derive(Args)]
pub struct KeyArgs {
    /// Key as 0x-prefixed hex or hi:lo
    #[arg(short, long, conflicts_with = "key_file", required_unless_present = "key_file")]
    pub key: Option<String>,

    /// TOML file describing the key field by field
    #[arg(long)]
    pub key_file: Option<PathBuf>,
}

impl KeyArgs {
    pub fn resolve(&self) -> Result<VShaderId> {
        match (&self.key, &self.key_file) {
            (Some(text), _) => Ok(text.parse()?),
            (None, Some(path)) => load_key_file(path),
            (None, None) => anyhow::bail!("Either --key or --key-file is required"),
        }
    }
}

fn load_key_file(path: &Path) -> Result<VShaderId> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read key file: {}", path.display()))?;
    let config = VertexKeyConfig::from_toml_str(&text)
        .with_context(|| format!("Failed to parse key file: {}", path.display()))?;
    Ok(config.to_key()?)
}

/// Print a shader to stdout, or write it to `output`
pub fn emit(shader: &GeneratedShader, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, &shader.source)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Wrote {:?} shader to {} ({} bytes, xxh3 {:016x})",
                shader.stage,
                path.display(),
                shader.len(),
                shader.fingerprint()
            );
        }
        None => {
            print!("{}", shader.source);
            tracing::info!("{:?} shader: {} bytes, xxh3 {:016x}", shader.stage, shader.len(), shader.fingerprint());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_args(key: Option<&str>, key_file: Option<PathBuf>) -> KeyArgs {
        KeyArgs {
            key: key.map(str::to_string),
            key_file,
        }
    }

    #[test]
    fn test_key_from_hex_and_file_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.toml");
        std::fs::write(&path, "hardware_transform = true\nhas_normal = true\n").unwrap();

        let from_file = key_args(None, Some(path)).resolve().unwrap();
        assert!(from_file.use_hw_transform());
        assert!(from_file.has_normal());

        let text = format!("0x{:016x}", from_file.raw());
        assert_eq!(key_args(Some(&text), None).resolve().unwrap(), from_file);
    }

    #[test]
    fn test_missing_key_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = key_args(None, Some(dir.path().join("absent.toml"))).resolve().unwrap_err();
        assert!(err.to_string().contains("Failed to read key file"));
    }

    #[test]
    fn test_dialect_config_overrides_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dialect.toml");
        std::fs::write(
            &path,
            "shading_language = \"embedded-glsl\"\nglsl_version_number = 100\nis_embedded_profile = true\n",
        )
        .unwrap();
        let args = DialectArgs {
            dialect: "hlsl-d3d11".to_string(),
            dialect_config: Some(path),
            driver_info: Some("test driver".to_string()),
            extensions: vec!["#extension GL_OES_standard_derivatives : enable".to_string()],
        };
        let compiler = args.compiler().unwrap();
        assert_eq!(compiler.dialect().language(), ShaderLanguage::EmbeddedGlsl);
        assert!(!compiler.dialect().supports_es30_syntax);
        assert_eq!(compiler.dialect().driver_info.as_deref(), Some("test driver"));
        assert_eq!(compiler.extensions().len(), 1);
    }

    #[test]
    fn test_unknown_dialect_name() {
        let args = DialectArgs {
            dialect: "metal".to_string(),
            dialect_config: None,
            driver_info: None,
            extensions: Vec::new(),
        };
        assert!(args.descriptor().is_err());
    }
}
