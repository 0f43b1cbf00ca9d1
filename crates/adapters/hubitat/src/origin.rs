//! Origin port implementation for one Hubitat hub.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use luma_app::ports::{Origin, OriginCommand};
use luma_domain::error::LumaError;
use luma_domain::snapshot::{DeviceState, GroupState, OriginSnapshot};
use luma_domain::stage::LightState;
use luma_domain::time::now;

use crate::error::HubitatError;
use crate::payload::{mired_to_kelvin, DeviceEntry};
use crate::transport::MakerTransport;

/// One Hubitat hub exposed as an origin.
pub struct HubitatOrigin<T> {
    name: String,
    transport: T,
    /// Device ids seen with a `switch` attribute during the last refresh.
    switchable: RwLock<HashSet<String>>,
}

impl<T: MakerTransport> HubitatOrigin<T> {
    pub fn new(name: impl Into<String>, transport: T) -> Self {
        Self {
            name: name.into(),
            transport,
            switchable: RwLock::new(HashSet::new()),
        }
    }

    async fn snapshot(&self) -> Result<OriginSnapshot, HubitatError> {
        let raw = self.transport.devices().await?;
        let mut snapshot = OriginSnapshot::new(now());
        let mut switchable = HashSet::new();

        for value in raw {
            let entry: DeviceEntry = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!(origin = %self.name, %error, "skipping malformed device");
                    continue;
                }
            };
            if entry.switchable() {
                switchable.insert(entry.id.clone());
                snapshot.groups.insert(
                    entry.id.clone(),
                    GroupState {
                        label: Some(entry.display().to_string()),
                        active_scene: None,
                        stage: entry.stage(),
                    },
                );
            }
            snapshot.devices.insert(
                entry.id.clone(),
                DeviceState {
                    label: Some(entry.display().to_string()),
                    changed: entry.changed(),
                    reachable: true,
                    battery: entry.battery(),
                    button: None,
                    contact: entry.contact(),
                    motion: entry.motion(),
                },
            );
        }

        *self.switchable.write().await = switchable;
        Ok(snapshot)
    }

    async fn apply(&self, command: &OriginCommand) -> Result<(), HubitatError> {
        let Some(stage) = command.stage else {
            if let Some(label) = &command.scene_label {
                return Err(HubitatError::SceneUnsupported {
                    label: label.clone(),
                });
            }
            return Ok(());
        };
        if stage.is_empty() {
            return Ok(());
        }
        if !self.switchable.read().await.contains(&command.group) {
            return Err(HubitatError::UnknownDevice(command.group.clone()));
        }

        if let Some(state) = stage.state {
            let name = match state {
                LightState::On => "on",
                LightState::Off => "off",
            };
            self.transport.command(&command.group, name, None).await?;
        }
        if let Some(level) = stage.level {
            self.transport
                .command(&command.group, "setLevel", Some(&level.to_string()))
                .await?;
        }
        if let Some(mired) = stage.color_temp {
            let kelvin = mired_to_kelvin(mired);
            self.transport
                .command(
                    &command.group,
                    "setColorTemperature",
                    Some(&kelvin.to_string()),
                )
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<T: MakerTransport> Origin for HubitatOrigin<T> {
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
