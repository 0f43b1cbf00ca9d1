//! Origin snapshots: the merged view of one controller's state.
//!
//! Origins fetch several vendor resources and merge them into a single
//! [`OriginSnapshot`]. Two consecutive snapshots are then diffed to derive
//! the [`StreamEvent`]s that occurred in between, so polling origins feed
//! the same pipeline as streaming ones.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::stage::Stage;
use crate::stream::{ButtonEvent, ContactState, StreamEvent, StreamKind};
use crate::time::Timestamp;

/// Last-known state of one vendor device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    /// Vendor display label.
    pub label: Option<String>,
    /// When the device last reported any change.
    pub changed: Option<Timestamp>,
    pub reachable: bool,
    pub battery: Option<u8>,
    /// Last button phase, for switches.
    pub button: Option<ButtonEvent>,
    /// Last contact reading, for contact sensors.
    pub contact: Option<ContactState>,
    /// Last motion reading, for motion sensors.
    pub motion: Option<bool>,
}

/// Last-known state of one vendor group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupState {
    /// Vendor display label.
    pub label: Option<String>,
    /// Vendor scene id currently active, when the vendor reports one.
    pub active_scene: Option<String>,
    /// Current light stage of the group.
    pub stage: Stage,
}

/// One vendor scene definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    /// Vendor display label.
    pub label: Option<String>,
    /// Vendor-unique id of the group the scene belongs to.
    pub group: Option<String>,
}

/// Last-known state of one network client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientState {
    /// Vendor display name or hostname.
    pub label: Option<String>,
    pub last_seen: Timestamp,
}

/// Merged state of everything one origin can see, keyed by vendor-unique
/// identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginSnapshot {
    pub devices: HashMap<String, DeviceState>,
    pub groups: HashMap<String, GroupState>,
    /// Vendor scene definitions, keyed by vendor scene id. Not diffed;
    /// scene *activation* is reported through [`GroupState::active_scene`].
    pub scenes: HashMap<String, SceneState>,
    pub clients: HashMap<String, ClientState>,
    /// When the snapshot was taken.
    pub taken: Timestamp,
}

impl OriginSnapshot {
    /// Create an empty snapshot taken at the given instant.
    #[must_use]
    pub fn new(taken: Timestamp) -> Self {
        Self {
            devices: HashMap::new(),
            groups: HashMap::new(),
            scenes: HashMap::new(),
            clients: HashMap::new(),
            taken,
        }
    }

    /// Derive the stream events implied by moving from `self` to `newer`.
    ///
    /// Sensor readings produce typed events when they change; devices and
    /// groups appearing for the first time produce no events (there is no
    /// transition to report).
    #[must_use]
    pub fn diff(&self, newer: &Self, origin: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        for (unique, state) in &newer.devices {
            let Some(old) = self.devices.get(unique) else {
                continue;
            };
            if state.button != old.button {
                if let Some(event) = state.button {
                    events.push(StreamEvent::new(
                        origin,
                        Some(unique.clone()),
                        StreamKind::Button { event },
                    ));
                }
            }
            if state.contact != old.contact {
                if let Some(contact) = state.contact {
                    events.push(StreamEvent::new(
                        origin,
                        Some(unique.clone()),
                        StreamKind::Contact { state: contact },
                    ));
                }
            }
            if state.motion != old.motion {
                if let Some(active) = state.motion {
                    events.push(StreamEvent::new(
                        origin,
                        Some(unique.clone()),
                        StreamKind::Motion { active },
                    ));
                }
            }
            if state.changed != old.changed
                && state.button == old.button
                && state.contact == old.contact
                && state.motion == old.motion
            {
                events.push(StreamEvent::new(
                    origin,
                    Some(unique.clone()),
                    StreamKind::DeviceChanged,
                ));
            }
        }

        for (unique, state) in &newer.groups {
            let Some(old) = self.groups.get(unique) else {
                continue;
            };
            if state.active_scene != old.active_scene {
                if let Some(scene) = &state.active_scene {
                    events.push(StreamEvent::new(
                        origin,
                        Some(unique.clone()),
                        StreamKind::SceneActive {
                            scene: scene.clone(),
                        },
                    ));
                }
            } else if state.stage != old.stage {
                events.push(StreamEvent::new(
                    origin,
                    Some(unique.clone()),
                    StreamKind::GroupChanged,
                ));
            }
        }

        for client in newer.clients.keys() {
            if !self.clients.contains_key(client) {
                events.push(StreamEvent::new(
                    origin,
                    None,
                    StreamKind::ClientSeen {
                        client: client.clone(),
                    },
                ));
            }
        }
        for client in self.clients.keys() {
            if !newer.clients.contains_key(client) {
                events.push(StreamEvent::new(
                    origin,
                    None,
                    StreamKind::ClientGone {
                        client: client.clone(),
                    },
                ));
            }
        }

        events
    }

    /// Look up a device's vendor-unique id by its vendor label.
    #[must_use]
    pub fn device_by_label(&self, label: &str) -> Option<&str> {
        self.devices
            .iter()
            .find(|(_, state)| state.label.as_deref() == Some(label))
            .map(|(unique, _)| unique.as_str())
    }

    /// Look up a vendor scene id by owning group and vendor label.
    #[must_use]
    pub fn scene_by_label(&self, group: &str, label: &str) -> Option<&str> {
        self.scenes
            .iter()
            .find(|(_, state)| {
                state.group.as_deref() == Some(group) && state.label.as_deref() == Some(label)
            })
            .map(|(unique, _)| unique.as_str())
    }

    /// Look up a group's vendor-unique id by its vendor label.
    #[must_use]
    pub fn group_by_label(&self, label: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, state)| state.label.as_deref() == Some(label))
            .map(|(unique, _)| unique.as_str())
    }
}
