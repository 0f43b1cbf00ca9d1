//! Children registry: every declared child, validated and indexed by name.
//!
//! Construction runs the full cross-reference check: rules may only
//! mention devices, groups, and scenes that were declared, and devices and
//! groups may only belong to configured origins. A config typo therefore
//! fails at startup, never at rule-fire time.

use std::collections::BTreeMap;

use luma_domain::aspire::Aspire;
use luma_domain::condition::{WhereCond, WhereKind};
use luma_domain::desire::Desire;
use luma_domain::device::Device;
use luma_domain::error::{LumaError, NotFoundError, ValidationError};
use luma_domain::group::Group;
use luma_domain::occur::OccurKind;
use luma_domain::scene::Scene;

/// Validated index of all declared children.
#[derive(Debug, Default)]
pub struct Children {
    origins: Vec<String>,
    devices: BTreeMap<String, Device>,
    groups: BTreeMap<String, Group>,
    scenes: BTreeMap<String, Scene>,
    desires: BTreeMap<String, Desire>,
    aspires: BTreeMap<String, Aspire>,
}

impl Children {
    /// Build and validate the registry.
    ///
    /// # Errors
    ///
    /// Returns [`LumaError::Validation`] on duplicate names, invalid
    /// children, or dangling references.
    pub fn new(
        origins: Vec<String>,
        devices: Vec<Device>,
        groups: Vec<Group>,
        scenes: Vec<Scene>,
        desires: Vec<Desire>,
        aspires: Vec<Aspire>,
    ) -> Result<Self, LumaError> {
        let mut children = Self {
            origins,
            ..Self::default()
        };

        for device in devices {
            device.validate()?;
            children.check_origin("device", &device.name, &device.origin)?;
            insert_unique(&mut children.devices, "device", device.name.clone(), device)?;
        }
        for group in groups {
            group.validate()?;
            children.check_origin("group", &group.name, &group.origin)?;
            insert_unique(&mut children.groups, "group", group.name.clone(), group)?;
        }
        for scene in scenes {
            scene.validate()?;
            insert_unique(&mut children.scenes, "scene", scene.name.clone(), scene)?;
        }
        for desire in desires {
            desire.validate()?;
            children.check_rule_refs("desire", &desire.name, &desire.groups, &desire.scene)?;
            children.check_wheres("desire", &desire.name, &desire.wheres)?;
            insert_unique(&mut children.desires, "desire", desire.name.clone(), desire)?;
        }
        for aspire in aspires {
            aspire.validate()?;
            children.check_rule_refs("aspire", &aspire.name, &aspire.groups, &aspire.scene)?;
            children.check_wheres("aspire", &aspire.name, &aspire.wheres)?;
            children.check_occurs("aspire", &aspire.name, &aspire.occurs)?;
            insert_unique(&mut children.aspires, "aspire", aspire.name.clone(), aspire)?;
        }

        Ok(children)
    }

    fn check_origin(
        &self,
        kind: &'static str,
        name: &str,
        origin: &str,
    ) -> Result<(), LumaError> {
        if self.origins.iter().any(|o| o == origin) {
            Ok(())
        } else {
            Err(reference_error(kind, name, "origin", origin))
        }
    }

    fn check_rule_refs(
        &self,
        kind: &'static str,
        name: &str,
        groups: &[String],
        scene: &Option<String>,
    ) -> Result<(), LumaError> {
        for group in groups {
            if !self.groups.contains_key(group) {
                return Err(reference_error(kind, name, "group", group));
            }
        }
        if let Some(scene) = scene {
            if !self.scenes.contains_key(scene) {
                return Err(reference_error(kind, name, "scene", scene));
            }
        }
        Ok(())
    }

    fn check_wheres(
        &self,
        kind: &'static str,
        name: &str,
        wheres: &[WhereCond],
    ) -> Result<(), LumaError> {
        for cond in wheres {
            match &cond.kind {
                WhereKind::PhilipsChange(params) => {
                    for device in &params.devices {
                        if !self.devices.contains_key(device) {
                            return Err(reference_error(kind, name, "device", device));
                        }
                    }
                }
                WhereKind::PhilipsScene(params) => {
                    if !self.groups.contains_key(&params.group) {
                        return Err(reference_error(kind, name, "group", &params.group));
                    }
                    for scene in &params.scenes {
                        if !self.scenes.contains_key(scene) {
                            return Err(reference_error(kind, name, "scene", scene));
                        }
                    }
                }
                WhereKind::UbiquitiClient(params) => {
                    for client in &params.clients {
                        if !self.devices.contains_key(client) {
                            return Err(reference_error(kind, name, "device", client));
                        }
                    }
                }
                WhereKind::Store(_) | WhereKind::Period(_) | WhereKind::Regexp(_) => {}
            }
        }
        Ok(())
    }

    fn check_occurs(
        &self,
        kind: &'static str,
        name: &str,
        occurs: &[luma_domain::occur::OccurCond],
    ) -> Result<(), LumaError> {
        for cond in occurs {
            let device = match &cond.kind {
                OccurKind::PhilipsButton(params) => &params.device,
                OccurKind::PhilipsContact(params) => &params.device,
                OccurKind::PhilipsMotion(params) => &params.device,
            };
            if !self.devices.contains_key(device) {
                return Err(reference_error(kind, name, "device", device));
            }
        }
        Ok(())
    }

    /// Configured origin names.
    #[must_use]
    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// Look up a device by name.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no such device was declared.
    pub fn device(&self, name: &str) -> Result<&Device, NotFoundError> {
        self.devices.get(name).ok_or_else(|| NotFoundError {
            entity: "device",
            id: name.to_string(),
        })
    }

    /// Look up a group by name.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no such group was declared.
    pub fn group(&self, name: &str) -> Result<&Group, NotFoundError> {
        self.groups.get(name).ok_or_else(|| NotFoundError {
            entity: "group",
            id: name.to_string(),
        })
    }

    /// Look up a scene by name.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no such scene was declared.
    pub fn scene(&self, name: &str) -> Result<&Scene, NotFoundError> {
        self.scenes.get(name).ok_or_else(|| NotFoundError {
            entity: "scene",
            id: name.to_string(),
        })
    }

    /// All declared devices, in name order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// All declared desires, in name order.
    pub fn desires(&self) -> impl Iterator<Item = &Desire> {
        self.desires.values()
    }

    /// All declared aspires, in name order.
    pub fn aspires(&self) -> impl Iterator<Item = &Aspire> {
        self.aspires.values()
    }
}

fn insert_unique<T>(
    map: &mut BTreeMap<String, T>,
    kind: &'static str,
    name: String,
    value: T,
) -> Result<(), LumaError> {
    if map.contains_key(&name) {
        return Err(ValidationError::DuplicateName { kind, name }.into());
    }
    map.insert(name, value);
    Ok(())
}

fn reference_error(
    kind: &'static str,
    name: &str,
    target_kind: &'static str,
    target: &str,
) -> LumaError {
    ValidationError::UnknownReference {
        kind,
        name: name.to_string(),
        target_kind,
        target: target.to_string(),
    }
    .into()
}
