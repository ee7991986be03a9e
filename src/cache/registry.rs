//! Cache registry - Central management for all caches.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::{CacheConfig, TypedCache};
use crate::error::CacheError;

/// Central registry of named, typed caches.
///
/// Components create their caches through the registry so that the
/// same name always resolves to the same storage.
///
/// ## Example
///
/// ```rust
/// let registry = CacheRegistry::new();
/// let settings: TypedCache<WorkgroupId, Arc<SettingsBundle>> =
///     registry.get_or_create("workgroup_settings", &CacheConfig::unbounded())?;
/// ```
#[derive(Clone)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

/// Internal cache entry storing type-erased cache.
struct CacheEntry {
    cache: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl CacheEntry {
    fn downcast<K, V>(&self, name: &str) -> Result<TypedCache<K, V>, CacheError>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let requested = std::any::type_name::<TypedCache<K, V>>();
        let mismatch = || CacheError::TypeMismatch {
            name: name.to_string(),
            existing: self.type_name,
            requested,
        };

        if self.type_id != TypeId::of::<TypedCache<K, V>>() {
            return Err(mismatch());
        }

        self.cache
            .downcast_ref::<TypedCache<K, V>>()
            .cloned()
            .ok_or_else(mismatch)
    }
}

impl CacheRegistry {
    /// Create a new empty cache registry.
    pub fn new() -> Self {
        info!("Cache registry initialized");
        Self {
            caches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get an existing cache or create a new one if it doesn't exist.
    ///
    /// `config` only applies when the cache is created.
    pub fn get_or_create<K, V>(
        &self,
        name: &str,
        config: &CacheConfig,
    ) -> Result<TypedCache<K, V>, CacheError>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let mut caches = self.caches.write();

        if let Some(existing) = caches.get(name) {
            return existing.downcast(name);
        }

        debug!(cache = name, ?config, "Creating cache");

        let cache = TypedCache::new(name, config);
        caches.insert(
            name.to_string(),
            CacheEntry {
                cache: Box::new(cache.clone()),
                type_id: TypeId::of::<TypedCache<K, V>>(),
                type_name: std::any::type_name::<TypedCache<K, V>>(),
            },
        );

        Ok(cache)
    }

    /// Get a sorted list of all registered cache names.
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field("cache_count", &caches.len())
            .field("cache_names", &caches.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_returns_shared_cache() {
        let registry = CacheRegistry::new();
        let first: TypedCache<String, u32> = registry
            .get_or_create("counters", &CacheConfig::unbounded())
            .unwrap();
        first.insert("x".to_string(), 1);

        let second: TypedCache<String, u32> = registry
            .get_or_create("counters", &CacheConfig::unbounded().max_capacity(1))
            .unwrap();

        assert_eq!(second.get(&"x".to_string()), Some(1));
        assert_eq!(registry.cache_names(), vec!["counters".to_string()]);
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let registry = CacheRegistry::new();
        registry
            .get_or_create::<String, u32>("counters", &CacheConfig::unbounded())
            .unwrap();

        let err = registry
            .get_or_create::<u64, String>("counters", &CacheConfig::unbounded())
            .unwrap_err();
        assert!(err.to_string().contains("counters"));

        // The original cache is untouched by the failed request.
        let counters: TypedCache<String, u32> = registry
            .get_or_create("counters", &CacheConfig::unbounded())
            .unwrap();
        assert_eq!(counters.name(), "counters");
    }
}
