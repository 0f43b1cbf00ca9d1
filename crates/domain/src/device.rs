//! Device: a named handle onto one vendor device.
//!
//! The configured `name` is what rules reference; `unique` is the vendor's
//! own identifier (Hue resource id, Hubitat device id, client MAC) and may
//! be discovered at runtime rather than configured.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Declarative device child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Device {
    /// Name used by rules and conditions.
    pub name: String,
    /// Origin this device belongs to.
    pub origin: String,
    /// Vendor-side identifier, when pinned in config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<String>,
    /// Vendor-side display label, used to discover `unique` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Device {
    /// Create a device pinned to a vendor identifier.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        origin: impl Into<String>,
        unique: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            unique: Some(unique.into()),
            label: None,
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` or `origin` is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() || self.origin.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }
}
