//! UniFi-specific error type.

use luma_domain::error::{LumaError, OriginError};

/// Errors originating from the UniFi controller adapter.
#[derive(Debug, thiserror::Error)]
pub enum UbiquitiError {
    /// The HTTP transport failed.
    #[error("http transport error")]
    Http(#[from] reqwest::Error),

    /// The controller answered with a non-success status.
    #[error("controller returned status {0}")]
    Status(u16),

    /// A station payload did not parse.
    #[error("unexpected payload")]
    Payload(#[from] serde_json::Error),

    /// The login endpoint did not hand back a session cookie.
    #[error("login succeeded without a session cookie")]
    MissingSession,

    /// This origin observes the network, it performs nothing.
    #[error("unifi origins accept no actions")]
    Unsupported,
}

impl UbiquitiError {
    /// Wrap into the workspace error, tagged with the origin name.
    #[must_use]
    pub fn into_luma(self, origin: &str) -> LumaError {
        LumaError::Origin(OriginError::new(origin, self))
    }
}
