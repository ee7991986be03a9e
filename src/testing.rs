//! Test doubles shared by the unit tests.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{AssetError, SettingsError};
use crate::images::BlankAssetProvider;
use crate::settings::{RemoteSettingsClient, SettingSlot, SettingsBundle, WorkgroupId};

pub fn workgroup(raw: &str) -> WorkgroupId {
    WorkgroupId::parse(raw).unwrap()
}

/// Scripted settings service that counts fetches per workgroup.
#[derive(Default)]
pub struct MockSettingsClient {
    bundles: DashMap<WorkgroupId, SettingsBundle>,
    failing: DashSet<WorkgroupId>,
    fetches: DashMap<WorkgroupId, usize>,
}

impl MockSettingsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bundle(&self, workgroup: &WorkgroupId, slots: &[(&str, Option<&str>)]) {
        let bundle = SettingsBundle::from_slots(
            slots
                .iter()
                .map(|(key, value)| SettingSlot::new(*key, value.map(str::to_string))),
        );
        self.bundles.insert(workgroup.clone(), bundle);
    }

    /// Make fetches for `workgroup` fail with a 503 until `recover`.
    pub fn fail(&self, workgroup: &WorkgroupId) {
        self.failing.insert(workgroup.clone());
    }

    pub fn recover(&self, workgroup: &WorkgroupId) {
        self.failing.remove(workgroup);
    }

    pub fn fetch_count(&self, workgroup: &WorkgroupId) -> usize {
        self.fetches.get(workgroup).map(|count| *count).unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.iter().map(|entry| *entry.value()).sum()
    }
}

#[async_trait]
impl RemoteSettingsClient for MockSettingsClient {
    async fn fetch(&self, workgroup: &WorkgroupId) -> Result<SettingsBundle, SettingsError> {
        *self.fetches.entry(workgroup.clone()).or_insert(0) += 1;

        if self.failing.contains(workgroup) {
            return Err(SettingsError::Status(503));
        }

        // Unknown workgroups behave like the service's 404.
        self.bundles
            .get(workgroup)
            .map(|bundle| bundle.value().clone())
            .ok_or(SettingsError::Status(404))
    }
}

pub const BLANK_IMAGE: &[u8] = b"GIF89a-blank";

/// Blank asset served from memory.
pub struct StaticBlankAsset(pub Vec<u8>);

impl Default for StaticBlankAsset {
    fn default() -> Self {
        Self(BLANK_IMAGE.to_vec())
    }
}

#[async_trait]
impl BlankAssetProvider for StaticBlankAsset {
    async fn default_image_bytes(&self) -> Result<Vec<u8>, AssetError> {
        Ok(self.0.clone())
    }
}

/// Blank asset whose backing file is gone.
pub struct MissingBlankAsset;

#[async_trait]
impl BlankAssetProvider for MissingBlankAsset {
    async fn default_image_bytes(&self) -> Result<Vec<u8>, AssetError> {
        Err(AssetError::Io {
            path: "images/blank.gif".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        })
    }
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// A plain-text subscriber writing into this sink. Install it with
    /// `tracing::subscriber::set_default` on a current-thread runtime.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
