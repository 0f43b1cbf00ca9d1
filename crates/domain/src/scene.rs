//! Scene: a named light preset.
//!
//! A scene either maps onto a vendor scene (matched by `label` per group)
//! or carries its own [`Stage`] for origins without native scenes.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::stage::Stage;

/// Declarative scene child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    /// Name used by rules.
    pub name: String,
    /// Vendor-side scene label. Defaults to `name` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Fallback stage for origins that cannot recall vendor scenes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

impl Scene {
    /// Create a scene with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            stage: None,
        }
    }

    /// The vendor label to match against, falling back to the name.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] for a nameless scene, or the
    /// stage's own error when the fallback stage is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let Some(stage) = &self.stage {
            stage.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fall_back_to_name_as_label() {
        let scene = Scene::new("relax");
        assert_eq!(scene.label(), "relax");
    }

    #[test]
    fn should_prefer_explicit_label() {
        let mut scene = Scene::new("relax");
        scene.label = Some("Relax".to_string());
        assert_eq!(scene.label(), "Relax");
    }

    #[test]
    fn should_reject_invalid_fallback_stage() {
        let mut scene = Scene::new("relax");
        scene.stage = Some(Stage {
            level: Some(150),
            ..Stage::default()
        });
        assert!(scene.validate().is_err());
    }
}
