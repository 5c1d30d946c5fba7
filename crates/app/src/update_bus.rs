//! In-process update bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use crate::ports::{EntitiesUpdated, UpdatePublisher};

/// In-process update bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the update is simply dropped). A subscriber that falls behind by more
/// than the channel capacity sees `Lagged` and skips to the newest updates;
/// each update carries a full snapshot, so nothing is lost by skipping.
#[derive(Debug)]
pub struct InProcessUpdateBus {
    sender: broadcast::Sender<EntitiesUpdated>,
}

impl InProcessUpdateBus {
    /// Create a new update bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to updates on this bus.
    ///
    /// Returns a receiver that will get all updates published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EntitiesUpdated> {
        self.sender.subscribe()
    }
}

impl UpdatePublisher for InProcessUpdateBus {
    fn publish(&self, update: EntitiesUpdated) {
        let cycle = update.cycle;
        if self.sender.send(update).is_err() {
            tracing::trace!(cycle, "no update subscribers");
        }
    }
}
