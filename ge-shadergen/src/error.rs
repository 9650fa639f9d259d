use crate::dialect::ShaderLanguage;
use crate::ge_constants::PixelFormat;

/// Error type for shader generation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShaderGenError {
    /// Reinterpreting between packed formats needs integer bit operations
    #[error("cannot reinterpret {from} as {to}: {language} has no bitwise integer ops")]
    UnsupportedConversion {
        from: PixelFormat,
        to: PixelFormat,
        language: ShaderLanguage,
    },

    /// Reinterpret endpoints must be 16-bit formats
    #[error("pixel format {0} is not a 16-bit packed format")]
    InvalidPixelFormat(PixelFormat),

    /// The key asks for something the generator cannot express
    #[error("unsupported vertex shader key for {language}: {reason}")]
    UnsupportedKey {
        reason: &'static str,
        language: ShaderLanguage,
    },

    /// Unparseable variant key text
    #[error("invalid vertex shader key '{0}' (expected 0x-prefixed hex or hi:lo)")]
    InvalidKey(String),

    /// Key configuration describes something the key cannot encode
    #[error("invalid vertex key config: {0}")]
    InvalidKeyConfig(String),

    /// Dialect configuration failed to parse
    #[error("invalid dialect config: {0}")]
    InvalidDialectConfig(String),

    /// Configuration file could not be read
    #[error("failed to read {path}: {message}")]
    ConfigIo { path: String, message: String },

    /// Unknown name on the command line or in a config file
    #[error("unknown {kind} '{value}'")]
    UnknownName { kind: &'static str, value: String },
}
