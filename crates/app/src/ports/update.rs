//! Update port: batched "entities updated" notifications for the presentation layer.

use hubpanel_domain::time::Timestamp;

use crate::entity_cache::CacheSnapshot;

/// Emitted once per completed refresh cycle, after every cache write of the
/// cycle is visible.
#[derive(Debug, Clone)]
pub struct EntitiesUpdated {
    /// Monotonically increasing cycle number, starting at 1.
    pub cycle: u64,
    pub completed_at: Timestamp,
    /// Point-in-time copy of the whole cache.
    pub readings: CacheSnapshot,
}

/// Delivers [`EntitiesUpdated`] notifications to whoever renders them.
pub trait UpdatePublisher {
    /// Publish to all current subscribers. Never blocks.
    fn publish(&self, update: EntitiesUpdated);
}

impl<T: UpdatePublisher> UpdatePublisher for std::sync::Arc<T> {
    fn publish(&self, update: EntitiesUpdated) {
        (**self).publish(update);
    }
}
