//! Stage: the state/color/level triple a rule drives a group towards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// On/off state of a light or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightState {
    On,
    Off,
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

impl FromStr for LightState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(ValidationError::InvalidLightState(other.to_string())),
        }
    }
}

/// Target light configuration. Every field is optional so a stage can
/// express "just dim" or "just switch off" without touching the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stage {
    /// Desired on/off state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<LightState>,
    /// Brightness percentage, `0..=100`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Color temperature in mireds, `153..=500`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temp: Option<u16>,
}

impl Stage {
    /// A stage that only switches on.
    #[must_use]
    pub fn on() -> Self {
        Self {
            state: Some(LightState::On),
            ..Self::default()
        }
    }

    /// A stage that only switches off.
    #[must_use]
    pub fn off() -> Self {
        Self {
            state: Some(LightState::Off),
            ..Self::default()
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LevelOutOfRange`] or
    /// [`ValidationError::ColorTempOutOfRange`] when a field is outside
    /// its accepted range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(level) = self.level {
            if level > 100 {
                return Err(ValidationError::LevelOutOfRange(level));
            }
        }
        if let Some(ct) = self.color_temp {
            if !(153..=500).contains(&ct) {
                return Err(ValidationError::ColorTempOutOfRange(ct));
            }
        }
        Ok(())
    }

    /// Overlay `other` onto `self`: fields set in `other` win.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            state: other.state.or(self.state),
            level: other.level.or(self.level),
            color_temp: other.color_temp.or(self.color_temp),
        }
    }

    /// Whether no field is set at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.level.is_none() && self.color_temp.is_none()
    }
}
