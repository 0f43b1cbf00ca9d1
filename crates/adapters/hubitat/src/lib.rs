//! # luma-adapter-hubitat
//!
//! Hubitat Elevation adapter speaking the Maker API.
//!
//! ## Responsibilities
//! - Implement the [`luma_app::ports::Origin`] port for one Hubitat hub
//! - Poll the Maker API device list and merge it into an
//!   [`luma_domain::snapshot::OriginSnapshot`]
//! - Execute action requests as device commands (`on`, `off`, `setLevel`,
//!   `setColorTemperature`)
//!
//! The Maker API has no rooms or scenes, so every switchable device is also
//! exposed as a group keyed by the device id. Scene recalls only succeed
//! through their stage fallback.
//!
//! ## Dependency rule
//! Depends on `luma-app` (for the port trait) and `luma-domain`. The `app`
//! and `domain` crates must never reference this adapter.

pub mod error;
pub mod origin;
pub mod payload;
pub mod transport;

pub use error::HubitatError;
pub use origin::HubitatOrigin;
pub use transport::{HttpMaker, MakerConfig, MakerTransport};
