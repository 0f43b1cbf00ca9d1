//! Desire: a declarative rule evaluated against wall-clock and store
//! conditions to pick a target light state for its groups.

use serde::{Deserialize, Serialize};

use crate::condition::WhereCond;
use crate::error::{LumaError, ValidationError};
use crate::items::ActionTarget;
use crate::stage::Stage;

/// A rule that continuously desires a state for its groups while its
/// conditions hold. Among competing desires the highest `weight` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Desire {
    pub name: String,
    /// Configured group names this desire drives.
    pub groups: Vec<String>,
    /// Where conditions; empty means always.
    #[serde(default)]
    pub wheres: Vec<WhereCond>,
    /// Target scene name (exclusive with `stage`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    /// Target stage (exclusive with `scene`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Priority among competing desires.
    #[serde(default)]
    pub weight: u32,
    /// Minimum seconds between re-fires against the same group.
    #[serde(default)]
    pub delay_secs: u64,
    /// Paused desires are skipped entirely.
    #[serde(default)]
    pub paused: bool,
}

impl Desire {
    /// Create a builder for constructing a [`Desire`].
    #[must_use]
    pub fn builder() -> DesireBuilder {
        DesireBuilder::default()
    }

    /// The action target this desire drives groups towards.
    ///
    /// Valid desires have exactly one of `scene` / `stage`; callers run
    /// [`validate`](Self::validate) at load time.
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
    /// Returns [`LumaError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `groups` is empty ([`ValidationError::NoGroups`])
    /// - not exactly one of `scene` / `stage` is set
    ///   ([`ValidationError::AmbiguousTarget`])
    /// - any where condition or the stage is itself invalid
    pub fn validate(&self) -> Result<(), LumaError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.groups.is_empty() {
            return Err(ValidationError::NoGroups.into());
        }
        if self.scene.is_some() == self.stage.is_some() {
            return Err(ValidationError::AmbiguousTarget.into());
        }
        if let Some(stage) = &self.stage {
            stage.validate()?;
        }
        for cond in &self.wheres {
            cond.validate()?;
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Desire`].
#[derive(Debug, Default)]
pub struct DesireBuilder {
    name: Option<String>,
    groups: Vec<String>,
    wheres: Vec<WhereCond>,
    scene: Option<String>,
    stage: Option<Stage>,
    weight: u32,
    delay_secs: u64,
    paused: bool,
}

impl DesireBuilder {
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
    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
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

    /// Consume the builder, validate, and return a [`Desire`].
    ///
    /// # Errors
    ///
    /// Returns [`LumaError::Validation`] if required fields are missing or
    /// invalid.
    pub fn build(self) -> Result<Desire, LumaError> {
        let desire = Desire {
            name: self.name.unwrap_or_default(),
            groups: self.groups,
            wheres: self.wheres,
            scene: self.scene,
            stage: self.stage,
            weight: self.weight,
            delay_secs: self.delay_secs,
            paused: self.paused,
        };
        desire.validate()?;
        Ok(desire)
    }
}
