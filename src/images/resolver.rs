//! Workgroup image resolution with blank-image fallback.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, error, warn};

use super::BlankAssetProvider;
use crate::error::ImageError;
use crate::settings::{SettingSlot, SettingsCache, WorkgroupId};

/// Resolves image settings to bytes.
///
/// Every failure (no workgroup, unreachable settings service, unset or
/// undecodable value) yields the blank image instead of an error.
#[derive(Clone)]
pub struct ImageResolver {
    settings: SettingsCache,
    blank: Arc<dyn BlankAssetProvider>,
}

impl ImageResolver {
    pub fn new(settings: SettingsCache, blank: Arc<dyn BlankAssetProvider>) -> Self {
        Self { settings, blank }
    }

    /// Get the decoded image stored under `image_name` for `workgroup`.
    pub async fn resolve_image(&self, image_name: &str, workgroup: Option<&WorkgroupId>) -> Vec<u8> {
        let Some(workgroup) = workgroup else {
            warn!(image = image_name, "Workgroup must be specified to retrieve image");
            return self.blank_image(image_name, None).await;
        };

        let encoded = match self.settings.get(workgroup, image_name).await {
            Some(SettingSlot {
                value: Some(value), ..
            }) => value,
            Some(_) => {
                debug!(workgroup = %workgroup, image = image_name, "Image setting is unset");
                return self.blank_image(image_name, Some(workgroup)).await;
            }
            None => {
                debug!(workgroup = %workgroup, image = image_name, "No image setting");
                return self.blank_image(image_name, Some(workgroup)).await;
            }
        };

        match decode_image(&encoded) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    workgroup = %workgroup,
                    image = image_name,
                    error = %e,
                    "Could not decode image"
                );
                self.blank_image(image_name, Some(workgroup)).await
            }
        }
    }

    /// The fallback image served in place of `image_name`, or no bytes at
    /// all if it can't be read.
    pub async fn blank_image(&self, image_name: &str, workgroup: Option<&WorkgroupId>) -> Vec<u8> {
        match self.blank.default_image_bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(
                    image = image_name,
                    workgroup = workgroup.map(tracing::field::display),
                    error = %e,
                    "Error getting blank image bytes"
                );
                Vec::new()
            }
        }
    }
}

/// Decode a base64 image value. Line breaks and other ASCII whitespace
/// inside the value are ignored.
pub fn decode_image(encoded: &str) -> Result<Vec<u8>, ImageError> {
    let compact: Vec<u8> = encoded
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}
