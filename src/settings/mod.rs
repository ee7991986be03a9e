//! Workgroup settings: data model, remote client and the cache in front of it.

mod cache;
mod client;
mod models;

pub use cache::{CACHE_NAME, SettingsCache};
pub use client::{HttpSettingsClient, RemoteSettingsClient};
pub use models::{SettingSlot, SettingsBundle, WorkgroupId};
