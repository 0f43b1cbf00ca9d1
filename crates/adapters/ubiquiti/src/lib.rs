//! # luma-adapter-ubiquiti
//!
//! Ubiquiti UniFi controller adapter for network presence.
//!
//! ## Responsibilities
//! - Implement the [`luma_app::ports::Origin`] port for one controller
//! - Poll the active station list and merge it into the `clients` side of
//!   an [`luma_domain::snapshot::OriginSnapshot`]
//!
//! This origin only observes. It never carries devices or groups and
//! rejects action requests, conditions and client seen/gone events are its
//! whole surface.
//!
//! ## Dependency rule
//! Depends on `luma-app` (for the port trait) and `luma-domain`. The `app`
//! and `domain` crates must never reference this adapter.

pub mod error;
pub mod origin;
pub mod payload;
pub mod transport;

pub use error::UbiquitiError;
pub use origin::UbiquitiOrigin;
pub use transport::{ControllerConfig, ControllerTransport, HttpController};
