//! Hue-specific error type.

use luma_domain::error::{LumaError, OriginError};

/// Errors originating from the Hue bridge adapter.
#[derive(Debug, thiserror::Error)]
pub enum PhilipsError {
    /// The HTTP transport failed.
    #[error("http transport error")]
    Http(#[from] reqwest::Error),

    /// The bridge answered with a non-success status.
    #[error("bridge returned status {0}")]
    Status(u16),

    /// A resource payload did not parse.
    #[error("unexpected payload")]
    Payload(#[from] serde_json::Error),

    /// No scene with the requested label exists in the group.
    #[error("no scene labelled {label} in group {group}")]
    UnknownScene { group: String, label: String },

    /// No grouped light service is known for the group.
    #[error("no grouped light for group {0}")]
    UnknownGroup(String),
}

impl PhilipsError {
    /// Wrap into the workspace error, tagged with the origin name.
    #[must_use]
    pub fn into_luma(self, origin: &str) -> LumaError {
        LumaError::Origin(OriginError::new(origin, self))
    }
}
