//! Cache-aside access to workgroup settings.
//!
//! Bundles are fetched from the settings service on first use and kept
//! until a workgroup change event evicts them. Remote failures are never
//! stored, so the next lookup retries.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::client::RemoteSettingsClient;
use super::models::{SettingSlot, SettingsBundle, WorkgroupId};
use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::error::{CacheError, SettingsError};
use crate::events::{self, ChangeNotifier};

/// Registry name of the bundle cache.
pub const CACHE_NAME: &str = "workgroup_settings";

/// Workgroup settings with cache-aside loading.
///
/// Clones share the same storage and remote client.
#[derive(Clone)]
pub struct SettingsCache {
    client: Arc<dyn RemoteSettingsClient>,
    bundles: TypedCache<WorkgroupId, Arc<SettingsBundle>>,
}

impl SettingsCache {
    pub fn new(
        client: Arc<dyn RemoteSettingsClient>,
        registry: &CacheRegistry,
        config: &CacheConfig,
    ) -> Result<Self, CacheError> {
        let bundles: TypedCache<WorkgroupId, Arc<SettingsBundle>> =
            registry.get_or_create(CACHE_NAME, config)?;
        debug!(cache = bundles.name(), "Settings cache ready");
        Ok(Self { client, bundles })
    }

    /// Subscribe to workgroup change events.
    ///
    /// Spawns the task that evicts changed workgroups. It runs until every
    /// `ChangeNotifier` clone is dropped.
    pub fn listen(&self, notifier: &ChangeNotifier) -> JoinHandle<()> {
        events::spawn_invalidation_listener(self.clone(), notifier.subscribe())
    }

    /// Look up one setting of a workgroup.
    ///
    /// Returns `None` when the key is absent from the bundle and also when
    /// the bundle could not be fetched; the failure is logged. Use
    /// [`SettingsCache::try_get`] to tell the two apart.
    pub async fn get(&self, workgroup: &WorkgroupId, key: &str) -> Option<SettingSlot> {
        match self.try_get(workgroup, key).await {
            Ok(slot) => slot,
            Err(e) => {
                warn!(
                    workgroup = %workgroup,
                    key,
                    error = %e,
                    "Error retrieving chat setting"
                );
                None
            }
        }
    }

    /// Like [`SettingsCache::get`], but surfaces remote failures.
    pub async fn try_get(
        &self,
        workgroup: &WorkgroupId,
        key: &str,
    ) -> Result<Option<SettingSlot>, SettingsError> {
        let bundle = self.bundle(workgroup).await?;
        Ok(bundle.get(key).cloned())
    }

    /// Get a workgroup's bundle, fetching and storing it on a miss.
    ///
    /// No lock is held while fetching. Concurrent misses for the same
    /// workgroup may each fetch; the last store wins.
    pub async fn bundle(&self, workgroup: &WorkgroupId) -> Result<Arc<SettingsBundle>, SettingsError> {
        if let Some(bundle) = self.bundles.get(workgroup) {
            debug!(workgroup = %workgroup, "Settings cache hit");
            return Ok(bundle);
        }

        debug!(workgroup = %workgroup, "Settings cache miss");

        let bundle = Arc::new(self.client.fetch(workgroup).await?);
        debug!(workgroup = %workgroup, slots = bundle.len(), "Fetched chat settings");

        self.bundles.insert(workgroup.clone(), Arc::clone(&bundle));
        Ok(bundle)
    }

    /// Evict a workgroup's bundle. Does nothing if it isn't cached.
    pub fn invalidate(&self, workgroup: &WorkgroupId) {
        self.bundles.invalidate(workgroup);
        debug!(workgroup = %workgroup, "Invalidated chat settings");
    }

    /// Evict every cached bundle.
    pub fn invalidate_all(&self) {
        self.bundles.invalidate_all();
        debug!("Invalidated all chat settings");
    }

    pub fn is_cached(&self, workgroup: &WorkgroupId) -> bool {
        self.bundles.contains(workgroup)
    }

    /// Approximate number of cached workgroups.
    pub fn entry_count(&self) -> u64 {
        self.bundles.entry_count()
    }
}

impl std::fmt::Debug for SettingsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsCache")
            .field("bundles", &self.bundles)
            .finish_non_exhaustive()
    }
}
