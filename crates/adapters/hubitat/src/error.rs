//! Hubitat-specific error type.

use luma_domain::error::{LumaError, OriginError};

/// Errors originating from the Hubitat adapter.
#[derive(Debug, thiserror::Error)]
pub enum HubitatError {
    /// The HTTP transport failed.
    #[error("http transport error")]
    Http(#[from] reqwest::Error),

    /// The hub answered with a non-success status.
    #[error("hub returned status {0}")]
    Status(u16),

    /// A device payload did not parse.
    #[error("unexpected payload")]
    Payload(#[from] serde_json::Error),

    /// The command targets a device id the hub never reported.
    #[error("unknown device {0}")]
    UnknownDevice(String),

    /// Scene recalls have no Maker API equivalent.
    #[error("scene {label} cannot be recalled, the Maker API has no scenes")]
    SceneUnsupported { label: String },
}

impl HubitatError {
    /// Wrap into the workspace error, tagged with the origin name.
    #[must_use]
    pub fn into_luma(self, origin: &str) -> LumaError {
        LumaError::Origin(OriginError::new(origin, self))
    }
}
