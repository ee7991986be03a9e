//! Remote settings retrieval.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::models::{SettingSlot, SettingsBundle, WorkgroupId};
use crate::error::SettingsError;

/// Source of workgroup settings bundles.
///
/// Implementations may fail transiently; the cache never stores a failed
/// fetch, so the next lookup simply asks again.
#[async_trait]
pub trait RemoteSettingsClient: Send + Sync {
    async fn fetch(&self, workgroup: &WorkgroupId) -> Result<SettingsBundle, SettingsError>;
}

/// Body of `GET /workgroups/{id}/settings`.
#[derive(Debug, Deserialize)]
struct RemoteSettings {
    settings: Vec<SettingSlot>,
}

/// Fetches settings from the workgroup service over HTTP.
pub struct HttpSettingsClient {
    client: Client,
    base_url: Url,
}

impl HttpSettingsClient {
    /// Create a client for the service at `base_url`.
    ///
    /// `timeout` bounds each request end to end.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, SettingsError> {
        if base_url.cannot_be_a_base() {
            return Err(SettingsError::BaseUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// URL of one workgroup's settings. The id is pushed as a single
    /// escaped path segment.
    fn settings_url(&self, workgroup: &WorkgroupId) -> Result<Url, SettingsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SettingsError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["workgroups", workgroup.as_str(), "settings"]);
        Ok(url)
    }
}

#[async_trait]
impl RemoteSettingsClient for HttpSettingsClient {
    async fn fetch(&self, workgroup: &WorkgroupId) -> Result<SettingsBundle, SettingsError> {
        let url = self.settings_url(workgroup)?;
        debug!(workgroup = %workgroup, url = %url, "Fetching chat settings");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            warn!(workgroup = %workgroup, status = %response.status(), "Settings service rejected request");
            return Err(SettingsError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let bundle = parse_bundle(&body)?;
        if bundle.is_empty() {
            debug!(workgroup = %workgroup, "Workgroup has no chat settings");
        }
        Ok(bundle)
    }
}

fn parse_bundle(body: &[u8]) -> Result<SettingsBundle, SettingsError> {
    let remote: RemoteSettings = serde_json::from_slice(body)?;
    Ok(SettingsBundle::from_slots(remote.settings))
}
