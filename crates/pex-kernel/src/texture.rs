//! Texture reference resolution.
//!
//! The kernel never loads images. It reports either a file path or an
//! inline image blob and leaves acquisition to the renderer.
//!
//! Inline data is base64 text. Payloads starting with a gzip or zlib header
//! are inflated first, which is how effect editors usually embed images.

use std::io::Read;
use std::path::PathBuf;

use base64::Engine;
use flate2::read::{GzDecoder, ZlibDecoder};
use pex_common::{ConfigError, ConfigResult};
use tracing::debug;

use crate::attributes::AttributeSource;

/// Element holding the texture reference.
const TEXTURE_ELEMENT: &str = "texture";

/// Largest decoded inline texture, in bytes.
pub const MAX_INLINE_TEXTURE_BYTES: u64 = 64 * 1024 * 1024;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Where the renderer should get the particle texture from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// Image file to be loaded by the renderer.
    File(PathBuf),
    /// Decoded image bytes (still in their image container format).
    Inline(Vec<u8>),
}

impl TextureSource {
    /// Resolves the texture reference of an emitter description.
    ///
    /// A non-empty `texture.name` takes precedence over `texture.data`.
    pub fn resolve(source: &impl AttributeSource) -> ConfigResult<Self> {
        let name = source.get_string(TEXTURE_ELEMENT, "name", "");
        if !name.trim().is_empty() {
            debug!("Texture file reference: {name}");
            return Ok(Self::File(PathBuf::from(name.trim())));
        }

        let data = source.get_string(TEXTURE_ELEMENT, "data", "");
        if !data.trim().is_empty() {
            let bytes = decode_inline(&data)?;
            debug!("Decoded inline texture ({} bytes)", bytes.len());
            return Ok(Self::Inline(bytes));
        }

        Err(ConfigError::TextureUnresolved)
    }

    /// Returns the file path, if this is a file reference.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Inline(_) => None,
        }
    }

    /// Returns the inline bytes, if this is inline data.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::File(_) => None,
            Self::Inline(bytes) => Some(bytes),
        }
    }
}

/// Decodes base64 inline data, inflating it when compressed.
fn decode_inline(data: &str) -> ConfigResult<Vec<u8>> {
    let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    let raw = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ConfigError::UnsupportedTextureEncoding(format!("invalid base64: {e}")))?;

    let bytes = if raw.starts_with(&GZIP_MAGIC) {
        inflate(GzDecoder::new(raw.as_slice()), "gzip", MAX_INLINE_TEXTURE_BYTES)?
    } else if is_zlib_header(&raw) {
        inflate(ZlibDecoder::new(raw.as_slice()), "zlib", MAX_INLINE_TEXTURE_BYTES)?
    } else {
        raw
    };

    if bytes.is_empty() {
        return Err(ConfigError::UnsupportedTextureEncoding(
            "inline texture data is empty".to_string(),
        ));
    }

    Ok(bytes)
}

/// Inflates at most `limit` bytes; larger payloads are rejected.
fn inflate(decoder: impl Read, format: &str, limit: u64) -> ConfigResult<Vec<u8>> {
    let mut out = Vec::new();
    decoder
        .take(limit.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|e| {
            ConfigError::UnsupportedTextureEncoding(format!(
                "{format} payload failed to inflate: {e}"
            ))
        })?;

    if out.len() as u64 > limit {
        return Err(ConfigError::UnsupportedTextureEncoding(format!(
            "{format} payload inflates beyond {limit} bytes"
        )));
    }
    Ok(out)
}

/// Checks CMF/FLG of a zlib stream (deflate method, valid check bits).
fn is_zlib_header(bytes: &[u8]) -> bool {
    match bytes {
        [cmf, flg, ..] => cmf & 0x0f == 8 && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}
