//! HTTP surface of the settings service.
//!
//! Provides `/health`, `/images/:name`, `/workgroups/:workgroup/settings/:key`
//! and `/workgroups/:workgroup/changed`.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::cache::{CacheConfig, CacheRegistry};
use crate::error::CacheError;
use crate::events::{self, ChangeNotifier};
use crate::images::{BlankAssetProvider, ImageResolver};
use crate::settings::{RemoteSettingsClient, SettingsCache};

pub use routes::create_router;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Workgroup settings cache.
    pub settings: SettingsCache,

    /// Image resolution on top of `settings`.
    pub images: ImageResolver,

    /// Publisher for workgroup change events.
    pub notifier: ChangeNotifier,

    /// Cache registry the settings cache lives in.
    pub cache: Arc<CacheRegistry>,

    /// Secret expected in `X-Notify-Secret`, if any.
    pub notify_secret: Option<Arc<str>>,

    /// Supervisor of the invalidation listener; finished means no more
    /// change events reach the cache.
    pub listener: Arc<JoinHandle<bool>>,

    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build the settings cache and subscribe it to `notifier`.
    ///
    /// This is the only place a `SettingsCache` is constructed; handlers
    /// receive clones of it through the state.
    pub fn new(
        client: Arc<dyn RemoteSettingsClient>,
        blank: Arc<dyn BlankAssetProvider>,
        cache: Arc<CacheRegistry>,
        cache_config: &CacheConfig,
        notifier: ChangeNotifier,
        notify_secret: Option<String>,
    ) -> Result<Self, CacheError> {
        let settings = SettingsCache::new(client, &cache, cache_config)?;
        let listener = events::supervise_listener(settings.listen(&notifier));

        let images = ImageResolver::new(settings.clone(), blank);

        Ok(Self {
            settings,
            images,
            notifier,
            cache,
            notify_secret: notify_secret.map(Arc::from),
            listener: Arc::new(listener),
            started_at: Utc::now(),
        })
    }
}

/// Serve the router until Ctrl+C.
pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping HTTP server");
}
