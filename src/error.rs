//! Error types.
//!
//! None of these reach an HTTP client directly: the settings and image
//! paths recover from them and log, see `SettingsCache::get` and
//! `ImageResolver::resolve_image`.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain a workgroup's settings bundle.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid workgroup id: {0:?}")]
    InvalidWorkgroup(String),

    #[error("settings service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("settings service returned status {0}")]
    Status(u16),

    #[error("malformed settings response: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("settings service URL cannot be used as a base: {0}")]
    BaseUrl(String),
}

/// Failure to turn a stored image setting into bytes.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Failure to load the fallback blank image.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache '{name}' is registered as {existing}, not {requested}")]
    TypeMismatch {
        name: String,
        existing: &'static str,
        requested: &'static str,
    },
}
