//! Shutdown signalling.
//!
//! Two flags propagate through watch channels: `vacate` asks workers to
//! drain their queues and exit, `cancel` asks them to stop immediately,
//! abandoning queued work.

use tokio::sync::watch;

/// Sender side, held by whoever owns the service lifecycle.
#[derive(Debug)]
pub struct Signals {
    vacate: watch::Sender<bool>,
    cancel: watch::Sender<bool>,
}

impl Default for Signals {
    fn default() -> Self {
        Self::new()
    }
}

impl Signals {
    #[must_use]
    pub fn new() -> Self {
        let (vacate, _) = watch::channel(false);
        let (cancel, _) = watch::channel(false);
        Self { vacate, cancel }
    }

    /// Ask workers to finish queued work and exit.
    pub fn vacate(&self) {
        let _ = self.vacate.send(true);
    }

    /// Ask workers to exit immediately.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// A fresh watch over both flags.
    #[must_use]
    pub fn watch(&self) -> SignalWatch {
        SignalWatch {
            vacate: self.vacate.subscribe(),
            cancel: self.cancel.subscribe(),
        }
    }
}

/// Receiver side, cloned into every worker task.
#[derive(Clone)]
pub struct SignalWatch {
    vacate: watch::Receiver<bool>,
    cancel: watch::Receiver<bool>,
}

impl SignalWatch {
    #[must_use]
    pub fn vacated(&self) -> bool {
        *self.vacate.borrow()
    }

    #[must_use]
    pub fn cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Complete when either flag is raised (or the sender is gone).
    pub async fn interrupted(&mut self) {
        let vacate = self.vacate.wait_for(|raised| *raised);
        let cancel = self.cancel.wait_for(|raised| *raised);
        tokio::select! {
            _ = vacate => {}
            _ = cancel => {}
        }
    }
}
