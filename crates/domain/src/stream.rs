//! Stream events: what origins report as the world changes.
//!
//! Events come either from a vendor push stream or from diffing two
//! consecutive polled snapshots; downstream code cannot tell the
//! difference.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::time::Timestamp;

/// Button press phases reported by Hue-style switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonEvent {
    InitialPress,
    Repeat,
    ShortRelease,
    LongPress,
    LongRelease,
}

impl ButtonEvent {
    /// Parse a vendor event string (`"initial_press"`, …).
    #[must_use]
    pub fn from_vendor(value: &str) -> Option<Self> {
        match value {
            "initial_press" => Some(Self::InitialPress),
            "repeat" => Some(Self::Repeat),
            "short_release" => Some(Self::ShortRelease),
            "long_press" => Some(Self::LongPress),
            "long_release" => Some(Self::LongRelease),
            _ => None,
        }
    }
}

impl fmt::Display for ButtonEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InitialPress => "initial_press",
            Self::Repeat => "repeat",
            Self::ShortRelease => "short_release",
            Self::LongPress => "long_press",
            Self::LongRelease => "long_release",
        };
        f.write_str(text)
    }
}

/// Open/closed state of a contact sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactState {
    Open,
    Closed,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamKind {
    /// A switch reported a button phase.
    Button { event: ButtonEvent },
    /// A contact sensor opened or closed.
    Contact { state: ContactState },
    /// A motion sensor changed its activity flag.
    Motion { active: bool },
    /// A group's active scene changed.
    SceneActive { scene: String },
    /// A network client appeared.
    ClientSeen { client: String },
    /// A network client disappeared.
    ClientGone { client: String },
    /// Some other device attribute changed.
    DeviceChanged,
    /// A group's light stage changed without a scene recall.
    GroupChanged,
}

/// One observed change, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub id: EventId,
    /// Configured origin name.
    pub origin: String,
    /// Vendor-unique id of the device or group concerned, when any.
    pub device: Option<String>,
    pub kind: StreamKind,
    pub at: Timestamp,
}

impl StreamEvent {
    /// Create an event stamped now.
    #[must_use]
    pub fn new(origin: impl Into<String>, device: Option<String>, kind: StreamKind) -> Self {
        Self {
            id: EventId::new(),
            origin: origin.into(),
            device,
            kind,
            at: crate::time::now(),
        }
    }

    /// Same event, addressed by a different identifier. Used when the
    /// service resolves a vendor-unique id to a configured device name.
    #[must_use]
    pub fn renamed(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }
}
