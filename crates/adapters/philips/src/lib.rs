//! # luma-adapter-philips
//!
//! Philips Hue bridge adapter speaking the CLIP v2 REST API.
//!
//! ## Responsibilities
//! - Implement the [`luma_app::ports::Origin`] port for one Hue bridge
//! - Fetch devices, sensors, rooms, grouped lights, and scenes, and merge
//!   them into one [`luma_domain::snapshot::OriginSnapshot`]
//! - Execute action requests as scene recalls or grouped-light updates
//!
//! ## Dependency rule
//! Depends on `luma-app` (for the port trait) and `luma-domain`. The `app`
//! and `domain` crates must never reference this adapter.

pub mod error;
pub mod origin;
pub mod payload;
pub mod transport;

pub use error::PhilipsError;
pub use origin::PhilipsOrigin;
pub use transport::{BridgeConfig, BridgeTransport, HttpBridge};
