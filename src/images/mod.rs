//! Workgroup images stored as base64 settings.

mod asset;
mod resolver;

pub use asset::{BlankAssetProvider, FileBlankAsset};
pub use resolver::ImageResolver;
