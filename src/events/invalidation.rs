//! Cache invalidation driven by workgroup change events.

use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::WorkgroupChanged;
use crate::settings::SettingsCache;

/// Spawn the task that evicts changed workgroups from `cache`.
///
/// If the task falls behind and events are dropped, the whole cache is
/// cleared, since any workgroup may have been among the lost events. The
/// task ends once the channel is closed and drained.
pub fn spawn_invalidation_listener(
    cache: SettingsCache,
    mut events: Receiver<WorkgroupChanged>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Workgroup invalidation listener started");

        loop {
            match events.recv().await {
                Ok(event) => cache.invalidate(&event.workgroup),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed workgroup change events, clearing settings cache");
                    cache.invalidate_all();
                }
                Err(RecvError::Closed) => break,
            }
        }

        info!("Workgroup change channel closed, invalidation listener stopped");
    })
}

/// Watch an invalidation listener and report how it ended.
///
/// Resolves to `true` when the listener stopped because the change channel
/// closed, and `false` when it died early. An early exit means change
/// events are no longer applied, so it is logged as an error.
pub fn supervise_listener(listener: JoinHandle<()>) -> JoinHandle<bool> {
    tokio::spawn(async move {
        match listener.await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Invalidation listener terminated, cached settings may go stale");
                false
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::supervise_listener;

    use crate::cache::{CacheConfig, CacheRegistry};
    use crate::events::ChangeNotifier;
    use crate::settings::SettingsCache;
    use crate::testing::{MockSettingsClient, workgroup};

    fn cache_with(client: &Arc<MockSettingsClient>) -> SettingsCache {
        SettingsCache::new(client.clone(), &CacheRegistry::new(), &CacheConfig::unbounded()).unwrap()
    }

    #[tokio::test]
    async fn test_change_event_forces_refetch() {
        let w = workgroup("support@example.com");
        let client = Arc::new(MockSettingsClient::new());
        client.set_bundle(&w, &[("title", Some("Support"))]);
        let cache = cache_with(&client);

        let notifier = ChangeNotifier::new(16);
        let listener = cache.listen(&notifier);

        cache.get(&w, "title").await;
        assert_eq!(client.fetch_count(&w), 1);

        notifier.notify(w.clone());
        // Closing the channel lets the listener drain and exit.
        drop(notifier);
        listener.await.unwrap();

        assert!(!cache.is_cached(&w));
        cache.get(&w, "title").await;
        assert_eq!(client.fetch_count(&w), 2);
    }

    #[tokio::test]
    async fn test_event_for_uncached_workgroup_is_harmless() {
        let client = Arc::new(MockSettingsClient::new());
        let cache = cache_with(&client);

        let notifier = ChangeNotifier::new(16);
        let listener = cache.listen(&notifier);

        notifier.notify(workgroup("nobody@example.com"));
        notifier.notify(workgroup("nobody@example.com"));
        drop(notifier);
        listener.await.unwrap();

        assert_eq!(cache.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_lagging_listener_clears_cache() {
        let a = workgroup("a@example.com");
        let b = workgroup("b@example.com");
        let client = Arc::new(MockSettingsClient::new());
        client.set_bundle(&a, &[]);
        client.set_bundle(&b, &[]);
        let cache = cache_with(&client);
        cache.get(&a, "x").await;
        cache.get(&b, "x").await;

        // Capacity 1: on a current-thread runtime the listener cannot run
        // before both events are sent, so the first one is dropped.
        let notifier = ChangeNotifier::new(1);
        let listener = cache.listen(&notifier);
        notifier.notify(workgroup("c@example.com"));
        notifier.notify(workgroup("d@example.com"));
        drop(notifier);
        listener.await.unwrap();

        assert!(!cache.is_cached(&a));
        assert!(!cache.is_cached(&b));
    }

    #[tokio::test]
    async fn test_supervisor_reports_clean_shutdown() {
        let client = Arc::new(MockSettingsClient::new());
        let cache = cache_with(&client);

        let notifier = ChangeNotifier::new(16);
        let supervisor = supervise_listener(cache.listen(&notifier));
        drop(notifier);

        assert!(supervisor.await.unwrap());
    }

    #[tokio::test]
    async fn test_supervisor_reports_dead_listener() {
        let listener = tokio::spawn(async { panic!("listener crashed") });

        assert!(!supervise_listener(listener).await.unwrap());
    }
}
