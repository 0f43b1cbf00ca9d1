//! In-process stream bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use luma_domain::items::StreamItem;

/// Anything that accepts stream items for fan-out.
pub trait StreamPublisher: Send + Sync {
    /// Publish an item. Publishing never fails from the caller's view.
    fn publish(&self, item: StreamItem);
}

/// In-process stream bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the item is simply dropped).
#[derive(Clone, Debug)]
pub struct StreamBus {
    sender: broadcast::Sender<StreamItem>,
}

impl StreamBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to items on this bus.
    ///
    /// Returns a receiver that will get all items published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StreamItem> {
        self.sender.subscribe()
    }
}

impl StreamPublisher for StreamBus {
    fn publish(&self, item: StreamItem) {
        // broadcast::send fails only when there are zero receivers,
        // in which case the item is simply dropped.
        let _ = self.sender.send(item);
    }
}
