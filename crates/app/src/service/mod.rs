//! Service orchestration: queues, shutdown signals, workers, and the
//! long-running tasks that tie origins, engines, and persistence together.

pub mod queue;
pub mod service;
pub mod signals;
pub mod state;
pub(crate) mod worker;

pub use queue::{queue, QueueReceiver, QueueSender};
pub use service::{Service, ServiceHandle, ServiceOptions};
pub use signals::{SignalWatch, Signals};
pub use state::StateIndex;
