//! Workgroup change events.
//!
//! The remote service signals settings changes out of band. Producers
//! publish through a [`ChangeNotifier`]; the settings cache consumes the
//! events on its own task, so delivery never blocks a lookup.

mod invalidation;
mod notifier;

pub use invalidation::{spawn_invalidation_listener, supervise_listener};
pub use notifier::{ChangeNotifier, WorkgroupChanged};
