//! Error types for Pex.

use thiserror::Error;

/// Errors raised while turning an emitter description into a configuration.
///
/// Only loading can fail. Per-frame simulation degeneracies are recovered
/// locally and never surface as errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The attribute source could not be parsed at all.
    #[error("Malformed emitter source: {0}")]
    MalformedSource(String),

    /// Neither a texture file name nor inline texture data was supplied.
    #[error("No texture reference found (expected texture.name or texture.data)")]
    TextureUnresolved,

    /// Inline texture data is present but cannot be decoded.
    #[error("Unsupported inline texture encoding: {0}")]
    UnsupportedTextureEncoding(String),

    /// IO errors while reading a description file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
