//! Workgroup change notifications.

use tokio::sync::broadcast;
use tracing::debug;

use crate::settings::WorkgroupId;

/// A workgroup's settings changed on the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkgroupChanged {
    pub workgroup: WorkgroupId,
}

/// Fan-out channel for workgroup change events.
///
/// Cloning yields another sender on the same channel. Subscribers see
/// every event published after they subscribed.
#[derive(Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<WorkgroupChanged>,
}

impl ChangeNotifier {
    /// Create a notifier buffering up to `capacity` undelivered events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkgroupChanged> {
        self.sender.subscribe()
    }

    /// Publish a change event. Returns the number of subscribers reached.
    pub fn notify(&self, workgroup: WorkgroupId) -> usize {
        debug!(workgroup = %workgroup, "Workgroup changed");
        // Sending only fails when nobody is subscribed.
        self.sender
            .send(WorkgroupChanged { workgroup })
            .unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}
