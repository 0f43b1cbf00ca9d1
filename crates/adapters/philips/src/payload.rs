//! CLIP v2 resource payloads.
//!
//! Only the fields the merge needs are modelled; everything else the
//! bridge sends is ignored. Sensor resources carry both a current value
//! and a `*_report` block with the change instant, newer firmware only
//! fills the report.

use serde::Deserialize;

use luma_domain::stage::{LightState, Stage};
use luma_domain::stream::ContactState;
use luma_domain::time::Timestamp;

/// Reference to another resource.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRef {
    pub rid: String,
    pub rtype: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub name: String,
}

/// `/resource/device` entry.
#[derive(Debug, Deserialize)]
pub struct DeviceResource {
    pub id: String,
    pub metadata: Metadata,
}

/// `/resource/motion` entry.
#[derive(Debug, Deserialize)]
pub struct MotionResource {
    pub owner: ResourceRef,
    pub motion: MotionBlock,
}

#[derive(Debug, Deserialize)]
pub struct MotionBlock {
    #[serde(default)]
    pub motion: Option<bool>,
    #[serde(default)]
    pub motion_report: Option<MotionReport>,
}

#[derive(Debug, Deserialize)]
pub struct MotionReport {
    pub changed: Timestamp,
    pub motion: bool,
}

impl MotionResource {
    #[must_use]
    pub fn active(&self) -> Option<bool> {
        self.motion
            .motion_report
            .as_ref()
            .map(|report| report.motion)
            .or(self.motion.motion)
    }

    #[must_use]
    pub fn changed(&self) -> Option<Timestamp> {
        self.motion.motion_report.as_ref().map(|report| report.changed)
    }
}

/// `/resource/button` entry.
#[derive(Debug, Deserialize)]
pub struct ButtonResource {
    pub owner: ResourceRef,
    pub button: ButtonBlock,
}

#[derive(Debug, Deserialize)]
pub struct ButtonBlock {
    #[serde(default)]
    pub last_event: Option<String>,
    #[serde(default)]
    pub button_report: Option<ButtonReport>,
}

#[derive(Debug, Deserialize)]
pub struct ButtonReport {
    pub updated: Timestamp,
    pub event: String,
}

impl ButtonResource {
    #[must_use]
    pub fn event(&self) -> Option<&str> {
        self.button
            .button_report
            .as_ref()
            .map(|report| report.event.as_str())
            .or(self.button.last_event.as_deref())
    }

    #[must_use]
    pub fn changed(&self) -> Option<Timestamp> {
        self.button.button_report.as_ref().map(|report| report.updated)
    }
}

/// `/resource/contact` entry.
#[derive(Debug, Deserialize)]
pub struct ContactResource {
    pub owner: ResourceRef,
    #[serde(default)]
    pub contact_report: Option<ContactReport>,
}

#[derive(Debug, Deserialize)]
pub struct ContactReport {
    pub changed: Timestamp,
    pub state: String,
}

impl ContactResource {
    /// The bridge reports `contact` for a closed sensor.
    #[must_use]
    pub fn state(&self) -> Option<ContactState> {
        match self.contact_report.as_ref().map(|report| report.state.as_str()) {
            Some("contact") => Some(ContactState::Closed),
            Some("no_contact") => Some(ContactState::Open),
            _ => None,
        }
    }

    #[must_use]
    pub fn changed(&self) -> Option<Timestamp> {
        self.contact_report.as_ref().map(|report| report.changed)
    }
}

/// `/resource/device_power` entry.
#[derive(Debug, Deserialize)]
pub struct PowerResource {
    pub owner: ResourceRef,
    #[serde(default)]
    pub power_state: Option<PowerState>,
}

#[derive(Debug, Deserialize)]
pub struct PowerState {
    #[serde(default)]
    pub battery_level: Option<u8>,
}

/// `/resource/zigbee_connectivity` entry.
#[derive(Debug, Deserialize)]
pub struct ConnectivityResource {
    pub owner: ResourceRef,
    pub status: String,
}

/// `/resource/room` entry.
#[derive(Debug, Deserialize)]
pub struct RoomResource {
    pub id: String,
    pub metadata: Metadata,
    #[serde(default)]
    pub services: Vec<ResourceRef>,
}

impl RoomResource {
    /// The room's grouped light service, when any.
    #[must_use]
    pub fn grouped_light(&self) -> Option<&str> {
        self.services
            .iter()
            .find(|service| service.rtype == "grouped_light")
            .map(|service| service.rid.as_str())
    }
}

/// `/resource/grouped_light` entry.
#[derive(Debug, Deserialize)]
pub struct GroupedLightResource {
    pub id: String,
    #[serde(default)]
    pub on: Option<OnBlock>,
    #[serde(default)]
    pub dimming: Option<DimmingBlock>,
    #[serde(default)]
    pub color_temperature: Option<ColorTemperatureBlock>,
}

#[derive(Debug, Deserialize)]
pub struct OnBlock {
    pub on: bool,
}

#[derive(Debug, Deserialize)]
pub struct DimmingBlock {
    pub brightness: f64,
}

#[derive(Debug, Deserialize)]
pub struct ColorTemperatureBlock {
    #[serde(default)]
    pub mirek: Option<u16>,
}

impl GroupedLightResource {
    /// The grouped light's current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        Stage {
            state: self.on.as_ref().map(|block| {
                if block.on {
                    LightState::On
                } else {
                    LightState::Off
                }
            }),
            level: self
                .dimming
                .as_ref()
                .map(|block| block.brightness.round().clamp(0.0, 100.0) as u8),
            color_temp: self
                .color_temperature
                .as_ref()
                .and_then(|block| block.mirek),
        }
    }
}

/// `/resource/scene` entry.
#[derive(Debug, Deserialize)]
pub struct SceneResource {
    pub id: String,
    pub metadata: Metadata,
    pub group: ResourceRef,
    #[serde(default)]
    pub status: Option<SceneStatus>,
}

#[derive(Debug, Deserialize)]
pub struct SceneStatus {
    pub active: String,
}

impl SceneResource {
    /// Whether the bridge reports this scene as currently recalled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|status| status.active != "inactive")
    }
}
