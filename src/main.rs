//! Webchat Settings - Workgroup settings and image service
//!
//! Serves workgroup settings and images to the web chat client, caching
//! each workgroup's settings until the workgroup service reports a change.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `cache` - In-memory caching with Moka
//! - `settings` - Workgroup settings model, remote client and cache
//! - `events` - Workgroup change notifications and cache invalidation
//! - `images` - Image settings decoding with blank-image fallback
//! - `http` - Axum routes

mod cache;
mod config;
mod error;
mod events;
mod http;
mod images;
mod settings;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cache::CacheRegistry;
use config::Config;
use events::ChangeNotifier;
use http::AppState;
use images::FileBlankAsset;
use settings::HttpSettingsClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("webchat_settings=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting webchat settings service...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    info!("Settings service: {}", config.settings_url);

    let cache_config = config.cache_config();
    match (cache_config.max_capacity, cache_config.ttl) {
        (None, None) => info!("Settings cache is unbounded, entries live until invalidated"),
        (capacity, ttl) => info!("Settings cache bounds: capacity={:?}, ttl={:?}", capacity, ttl),
    }

    let client = HttpSettingsClient::new(config.settings_url.clone(), config.settings_timeout)
        .context("Failed to build settings client")?;

    let blank = FileBlankAsset::in_web_root(&config.web_root);
    info!("Blank image: {}", blank.path().display());

    if config.notify_secret.is_none() {
        info!("No NOTIFY_SECRET configured, change notifications are unauthenticated");
    }

    let state = AppState::new(
        Arc::new(client),
        Arc::new(blank),
        Arc::new(CacheRegistry::new()),
        &cache_config,
        ChangeNotifier::new(config.change_event_buffer),
        config.notify_secret.clone(),
    )?;

    http::serve(state, config.listen_port)
        .await
        .context("HTTP server error")?;

    info!("Webchat settings service stopped");
    Ok(())
}
