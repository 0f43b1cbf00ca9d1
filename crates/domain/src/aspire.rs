//! Aspire: a declarative rule evaluated against streamed events (motion,
//! button, contact) to pick a target light state for its groups.

use serde::{Deserialize, Serialize};

use crate::condition::WhereCond;
use crate::error::{LumaError, ValidationError};
use crate::items::ActionTarget;
use crate::occur::OccurCond;
use crate::stage::Stage;

/// A rule that fires when a stream event matches its occurs and its
/// optional where gate holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Aspire {
    pub name: String,
    /// Configured group names this aspire drives.
    pub groups: Vec<String>,
    /// Occur conditions; at least one family must match the event.
    pub occurs: Vec<OccurCond>,
    /// Optional where gate evaluated at fire time.
    #[serde(default)]
    pub wheres: Vec<WhereCond>,
    /// Target scene name (exclusive with `stage`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    /// Target stage (exclusive with `scene`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Minimum seconds between fires.
    #[serde(default)]
    pub delay_secs: u64,
    /// Paused aspires are skipped entirely.
    #[serde(default)]
    pub paused: bool,
}

impl Aspire {
    /// Create a builder for constructing an [`Aspire`].
    #[must_use]
    pub fn builder() -> AspireBuilder {
        AspireBuilder::default()
    }

    /// The action target this aspire fires.
    #[must_use]
    pub fn target(&self) -> ActionTarget {
        match (&self.scene, self.stage) {
            (Some(scene), None) => ActionTarget::Scene(scene.clone()),
            (None, Some(stage)) => ActionTarget::Stage(stage),
            _ => ActionTarget::Stage(Stage::default()),
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LumaError::Validation`] when the name is empty, no group
    /// or occur is declared, the scene/stage target is ambiguous, or any
    /// condition is invalid.
    pub fn validate(&self) -> Result<(), LumaError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.groups.is_empty() {
            return Err(ValidationError::NoGroups.into());
        }
        if self.occurs.is_empty() {
            return Err(ValidationError::EmptyCondition { driver: "occur" }.into());
        }
        if self.scene.is_some() == self.stage.is_some() {
            return Err(ValidationError::AmbiguousTarget.into());
        }
        if let Some(stage) = &self.stage {
            stage.validate()?;
        }
        for cond in &self.occurs {
            cond.validate()?;
        }
        for cond in &self.wheres {
            cond.validate()?;
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Aspire`].
#[derive(Debug, Default)]
pub struct AspireBuilder {
    name: Option<String>,
    groups: Vec<String>,
    occurs: Vec<OccurCond>,
    wheres: Vec<WhereCond>,
    scene: Option<String>,
    stage: Option<Stage>,
    delay_secs: u64,
    paused: bool,
}

impl AspireBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    #[must_use]
    pub fn occur(mut self, cond: OccurCond) -> Self {
        self.occurs.push(cond);
        self
    }

    #[must_use]
    pub fn r#where(mut self, cond: WhereCond) -> Self {
        self.wheres.push(cond);
        self
    }

    #[must_use]
    pub fn scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = Some(scene.into());
        self
    }

    #[must_use]
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    #[must_use]
    pub fn delay_secs(mut self, delay_secs: u64) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    #[must_use]
    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// Consume the builder, validate, and return an [`Aspire`].
    ///
    /// # Errors
    ///
    /// Returns [`LumaError::Validation`] if required fields are missing or
    /// invalid.
    pub fn build(self) -> Result<Aspire, LumaError> {
        let aspire = Aspire {
            name: self.name.unwrap_or_default(),
            groups: self.groups,
            occurs: self.occurs,
            wheres: self.wheres,
            scene: self.scene,
            stage: self.stage,
            delay_secs: self.delay_secs,
            paused: self.paused,
        };
        aspire.validate()?;
        Ok(aspire)
    }
}
