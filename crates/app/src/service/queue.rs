//! Bounded work queues between service tasks.
//!
//! Producers never block: when a queue is full the item is dropped and
//! logged, so a stuck vendor cannot back-pressure the whole service.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Create a named bounded queue.
#[must_use]
pub fn queue<T>(name: &'static str, capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (
        QueueSender { name, inner: sender },
        QueueReceiver { inner: receiver },
    )
}

/// Producer half of a work queue.
pub struct QueueSender<T> {
    name: &'static str,
    inner: mpsc::Sender<T>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: self.inner.clone(),
        }
    }
}

impl<T> QueueSender<T> {
    /// Enqueue without blocking, dropping the item when the queue is full
    /// or the consumer is gone.
    pub fn push(&self, item: T) {
        match self.inner.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(queue = self.name, "queue full, dropping item");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(queue = self.name, "queue closed, dropping item");
            }
        }
    }
}

/// Consumer half of a work queue.
pub struct QueueReceiver<T> {
    inner: mpsc::Receiver<T>,
}

impl<T> QueueReceiver<T> {
    /// Pull one item if any is waiting.
    pub fn try_pull(&mut self) -> Option<T> {
        self.inner.try_recv().ok()
    }
}
