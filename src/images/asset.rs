//! Fallback image asset.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::AssetError;

/// Location of the blank image under the web root.
pub const BLANK_IMAGE_PATH: &str = "images/blank.gif";

/// Supplies the image served when a workgroup image can't be resolved.
#[async_trait]
pub trait BlankAssetProvider: Send + Sync {
    async fn default_image_bytes(&self) -> Result<Vec<u8>, AssetError>;
}

/// Reads the blank image from disk on every request, so a replaced file
/// is picked up without a restart.
#[derive(Debug, Clone)]
pub struct FileBlankAsset {
    path: PathBuf,
}

impl FileBlankAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The blank image of the web root at `web_root`.
    pub fn in_web_root(web_root: &Path) -> Self {
        Self::new(web_root.join(BLANK_IMAGE_PATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BlankAssetProvider for FileBlankAsset {
    async fn default_image_bytes(&self) -> Result<Vec<u8>, AssetError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|source| AssetError::Io {
                path: self.path.clone(),
                source,
            })
    }
}
