//! Origin port implementation for one Hue bridge.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use luma_app::ports::{Origin, OriginCommand};
use luma_domain::error::LumaError;
use luma_domain::snapshot::{DeviceState, GroupState, OriginSnapshot, SceneState};
use luma_domain::stage::{LightState, Stage};
use luma_domain::stream::ButtonEvent;
use luma_domain::time::{now, Timestamp};

use crate::error::PhilipsError;
use crate::payload::{
    ButtonResource, ConnectivityResource, ContactResource, DeviceResource, GroupedLightResource,
    MotionResource, PowerResource, RoomResource, SceneResource,
};
use crate::transport::BridgeTransport;

/// Ids learnt during the last refresh, needed to address commands.
#[derive(Debug, Default)]
struct Cache {
    /// Room id to grouped light service id.
    grouped_lights: HashMap<String, String>,
    /// (room id, scene label) to scene id.
    scenes: HashMap<(String, String), String>,
}

/// One Hue bridge exposed as an origin.
pub struct PhilipsOrigin<T> {
    name: String,
    transport: T,
    cache: RwLock<Cache>,
}

impl<T: BridgeTransport> PhilipsOrigin<T> {
    pub fn new(name: impl Into<String>, transport: T) -> Self {
        Self {
            name: name.into(),
            transport,
            cache: RwLock::new(Cache::default()),
        }
    }

    /// Fetch one resource collection, skipping entries that fail to parse.
    async fn fetch<D: DeserializeOwned>(&self, rtype: &str) -> Result<Vec<D>, PhilipsError> {
        let raw = self.transport.get_resource(rtype).await?;
        Ok(raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(parsed) => Some(parsed),
                Err(error) => {
                    tracing::warn!(origin = %self.name, rtype, %error, "skipping malformed resource");
                    None
                }
            })
            .collect())
    }

    async fn snapshot(&self) -> Result<OriginSnapshot, PhilipsError> {
        let devices: Vec<DeviceResource> = self.fetch("device").await?;
        let motions: Vec<MotionResource> = self.fetch("motion").await?;
        let buttons: Vec<ButtonResource> = self.fetch("button").await?;
        let contacts: Vec<ContactResource> = self.fetch("contact").await?;
        let powers: Vec<PowerResource> = self.fetch("device_power").await?;
        let connectivity: Vec<ConnectivityResource> = self.fetch("zigbee_connectivity").await?;
        let rooms: Vec<RoomResource> = self.fetch("room").await?;
        let grouped: Vec<GroupedLightResource> = self.fetch("grouped_light").await?;
        let scenes: Vec<SceneResource> = self.fetch("scene").await?;

        let mut snapshot = OriginSnapshot::new(now());

        for device in devices {
            snapshot.devices.insert(
                device.id,
                DeviceState {
                    label: Some(device.metadata.name),
                    reachable: true,
                    ..DeviceState::default()
                },
            );
        }
        for link in connectivity {
            if let Some(state) = snapshot.devices.get_mut(&link.owner.rid) {
                state.reachable = link.status == "connected";
            }
        }
        for power in powers {
            if let Some(state) = snapshot.devices.get_mut(&power.owner.rid) {
                state.battery = power.power_state.and_then(|block| block.battery_level);
            }
        }
        for motion in motions {
            if let Some(state) = snapshot.devices.get_mut(&motion.owner.rid) {
                state.motion = motion.active();
                touch(state, motion.changed());
            }
        }
        for button in buttons {
            if let Some(state) = snapshot.devices.get_mut(&button.owner.rid) {
                state.button = button.event().and_then(ButtonEvent::from_vendor);
                touch(state, button.changed());
            }
        }
        for contact in contacts {
            if let Some(state) = snapshot.devices.get_mut(&contact.owner.rid) {
                state.contact = contact.state();
                touch(state, contact.changed());
            }
        }

        let stages: HashMap<String, Stage> = grouped
            .into_iter()
            .map(|light| {
                let stage = light.stage();
                (light.id, stage)
            })
            .collect();

        let mut cache = Cache::default();
        for room in rooms {
            let stage = room
                .grouped_light()
                .and_then(|service| stages.get(service).copied())
                .unwrap_or_default();
            if let Some(service) = room.grouped_light() {
                cache
                    .grouped_lights
                    .insert(room.id.clone(), service.to_string());
            }
            snapshot.groups.insert(
                room.id,
                GroupState {
                    label: Some(room.metadata.name),
                    active_scene: None,
                    stage,
                },
            );
        }

        for scene in scenes {
            cache.scenes.insert(
                (scene.group.rid.clone(), scene.metadata.name.clone()),
                scene.id.clone(),
            );
            if scene.is_active() {
                if let Some(group) = snapshot.groups.get_mut(&scene.group.rid) {
                    group.active_scene = Some(scene.id.clone());
                }
            }
            snapshot.scenes.insert(
                scene.id,
                SceneState {
                    label: Some(scene.metadata.name),
                    group: Some(scene.group.rid),
                },
            );
        }

        *self.cache.write().await = cache;
        Ok(snapshot)
    }

    async fn apply(&self, command: &OriginCommand) -> Result<(), PhilipsError> {
        if let Some(label) = &command.scene_label {
            let scene = {
                let cache = self.cache.read().await;
                cache
                    .scenes
                    .get(&(command.group.clone(), label.clone()))
                    .cloned()
            };
            match scene {
                Some(id) => {
                    return self
                        .transport
                        .put_resource(
                            "scene",
                            &id,
                            serde_json::json!({"recall": {"action": "active"}}),
                        )
                        .await;
                }
                None if command.stage.is_none() => {
                    return Err(PhilipsError::UnknownScene {
                        group: command.group.clone(),
                        label: label.clone(),
                    });
                }
                // unknown scene but a stage was provided, fall through
                None => {}
            }
        }

        let Some(stage) = command.stage else {
            return Ok(());
        };
        if stage.is_empty() {
            return Ok(());
        }
        let grouped = {
            let cache = self.cache.read().await;
            cache.grouped_lights.get(&command.group).cloned()
        };
        let Some(grouped) = grouped else {
            return Err(PhilipsError::UnknownGroup(command.group.clone()));
        };
        self.transport
            .put_resource("grouped_light", &grouped, stage_body(stage))
            .await
    }
}

fn touch(state: &mut DeviceState, changed: Option<Timestamp>) {
    state.changed = match (state.changed, changed) {
        (Some(current), Some(new)) => Some(current.max(new)),
        (current, new) => new.or(current),
    };
}

fn stage_body(stage: Stage) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    if let Some(state) = stage.state {
        body.insert(
            "on".to_string(),
            serde_json::json!({"on": state == LightState::On}),
        );
    }
    if let Some(level) = stage.level {
        body.insert(
            "dimming".to_string(),
            serde_json::json!({"brightness": level}),
        );
    }
    if let Some(mirek) = stage.color_temp {
        body.insert(
            "color_temperature".to_string(),
            serde_json::json!({"mirek": mirek}),
        );
    }
    serde_json::Value::Object(body)
}

#[async_trait]
impl<T: BridgeTransport> Origin for PhilipsOrigin<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn refresh(&self) -> Result<OriginSnapshot, LumaError> {
        self.snapshot().await.map_err(|err| err.into_luma(&self.name))
    }

    async fn perform(&self, command: &OriginCommand) -> Result<(), LumaError> {
        self.apply(command).await.map_err(|err| err.into_luma(&self.name))
    }
}
