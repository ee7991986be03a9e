//! Cache module - In-memory caching built on Moka.
//!
//! ## Architecture
//!
//! - `CacheRegistry` - Central registry holding all named caches
//! - `TypedCache` - Cheaply clonable typed handle to one cache
//! - `CacheConfig` - Capacity and expiry settings, unbounded by default
//!
//! ## Usage
//!
//! ```rust
//! let bundles = registry.get_or_create::<WorkgroupId, Arc<SettingsBundle>>(
//!     "workgroup_settings",
//!     &CacheConfig::unbounded(),
//! )?;
//!
//! bundles.insert(workgroup, bundle);
//! let bundle = bundles.get(&workgroup);
//! ```

mod config;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
