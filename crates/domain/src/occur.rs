//! Occur conditions: the drivers an aspire matches stream events with.
//!
//! Same closed-params and family scheme as [`crate::condition`]. Matching
//! is pure: by the time `matches` runs, the service has already resolved
//! the event's vendor-unique id to a configured device name.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::stream::{ButtonEvent, ContactState, StreamEvent, StreamKind};

fn default_family() -> String {
    "default".to_string()
}

/// One configured occur condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurCond {
    /// Evaluation group; occurs sharing a family are ANDed against the
    /// same event, families are ORed.
    #[serde(default = "default_family")]
    pub family: String,
    #[serde(flatten)]
    pub kind: OccurKind,
}

impl OccurCond {
    /// Wrap a driver in the `default` family.
    #[must_use]
    pub fn new(kind: OccurKind) -> Self {
        Self {
            family: default_family(),
            kind,
        }
    }

    /// Wrap a driver in a named family.
    #[must_use]
    pub fn in_family(kind: OccurKind, family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            kind,
        }
    }

    /// Check driver params.
    ///
    /// # Errors
    ///
    /// Propagates the driver's own validation error.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.kind.validate()
    }

    /// Whether this condition matches the (name-resolved) event.
    #[must_use]
    pub fn matches(&self, event: &StreamEvent) -> bool {
        self.kind.matches(event)
    }
}

/// The family-specific occur drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "driver", content = "params", rename_all = "snake_case")]
pub enum OccurKind {
    /// A switch reported one of the listed button phases.
    PhilipsButton(PhilipsButtonParams),
    /// A contact sensor reported one of the listed states.
    PhilipsContact(PhilipsContactParams),
    /// A motion sensor reported the expected activity flag.
    PhilipsMotion(PhilipsMotionParams),
}

impl OccurKind {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::PhilipsButton(params) => params.validate(),
            Self::PhilipsContact(params) => params.validate(),
            Self::PhilipsMotion(params) => params.validate(),
        }
    }

    pub(crate) fn matches(&self, event: &StreamEvent) -> bool {
        match self {
            Self::PhilipsButton(params) => params.matches(event),
            Self::PhilipsContact(params) => params.matches(event),
            Self::PhilipsMotion(params) => params.matches(event),
        }
    }
}

/// Params for the `philips_button` driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhilipsButtonParams {
    /// Configured device name of the switch.
    pub device: String,
    /// Phases that match; empty means any phase.
    #[serde(default)]
    pub events: Vec<ButtonEvent>,
}

impl PhilipsButtonParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.device.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    fn matches(&self, event: &StreamEvent) -> bool {
        if event.device.as_deref() != Some(self.device.as_str()) {
            return false;
        }
        match &event.kind {
            StreamKind::Button { event: phase } => {
                self.events.is_empty() || self.events.contains(phase)
            }
            _ => false,
        }
    }
}

/// Params for the `philips_contact` driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhilipsContactParams {
    /// Configured device name of the contact sensor.
    pub device: String,
    /// States that match; empty means any transition.
    #[serde(default)]
    pub states: Vec<ContactState>,
}

impl PhilipsContactParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.device.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    fn matches(&self, event: &StreamEvent) -> bool {
        if event.device.as_deref() != Some(self.device.as_str()) {
            return false;
        }
        match &event.kind {
            StreamKind::Contact { state } => self.states.is_empty() || self.states.contains(state),
            _ => false,
        }
    }
}

fn default_active() -> bool {
    true
}

/// Params for the `philips_motion` driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhilipsMotionParams {
    /// Configured device name of the motion sensor.
    pub device: String,
    /// Expected activity flag; defaults to motion starting.
    #[serde(default = "default_active")]
    pub active: bool,
}

impl PhilipsMotionParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.device.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    fn matches(&self, event: &StreamEvent) -> bool {
        if event.device.as_deref() != Some(self.device.as_str()) {
            return false;
        }
        matches!(&event.kind, StreamKind::Motion { active } if *active == self.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button_event(device: &str, phase: ButtonEvent) -> StreamEvent {
        StreamEvent::new(
            "hue",
            Some(device.to_string()),
            StreamKind::Button { event: phase },
        )
    }

    #[test]
    fn should_match_button_phase_in_list() {
        let cond = OccurCond::new(OccurKind::PhilipsButton(PhilipsButtonParams {
            device: "bedside_switch".to_string(),
            events: vec![ButtonEvent::ShortRelease],
        }));
        assert!(cond.matches(&button_event("bedside_switch", ButtonEvent::ShortRelease)));
        assert!(!cond.matches(&button_event("bedside_switch", ButtonEvent::LongPress)));
    }

    #[test]
    fn should_match_any_phase_when_list_empty() {
        let cond = OccurCond::new(OccurKind::PhilipsButton(PhilipsButtonParams {
            device: "bedside_switch".to_string(),
            events: vec![],
        }));
        assert!(cond.matches(&button_event("bedside_switch", ButtonEvent::Repeat)));
    }

    #[test]
    fn should_not_match_other_device() {
        let cond = OccurCond::new(OccurKind::PhilipsButton(PhilipsButtonParams {
            device: "bedside_switch".to_string(),
            events: vec![],
        }));
        assert!(!cond.matches(&button_event("hallway_switch", ButtonEvent::Repeat)));
    }

    #[test]
    fn should_match_contact_state() {
        let cond = OccurCond::new(OccurKind::PhilipsContact(PhilipsContactParams {
            device: "front_door".to_string(),
            states: vec![ContactState::Open],
        }));
        let event = StreamEvent::new(
            "hue",
            Some("front_door".to_string()),
            StreamKind::Contact {
                state: ContactState::Open,
            },
        );
        assert!(cond.matches(&event));
    }

    #[test]
    fn should_match_motion_activity_flag() {
        let cond = OccurCond::new(OccurKind::PhilipsMotion(PhilipsMotionParams {
            device: "kitchen_motion".to_string(),
            active: true,
        }));
        let active = StreamEvent::new(
            "hue",
            Some("kitchen_motion".to_string()),
            StreamKind::Motion { active: true },
        );
        let cleared = StreamEvent::new(
            "hue",
            Some("kitchen_motion".to_string()),
            StreamKind::Motion { active: false },
        );
        assert!(cond.matches(&active));
        assert!(!cond.matches(&cleared));
    }

    #[test]
    fn should_not_match_mismatched_kind() {
        let cond = OccurCond::new(OccurKind::PhilipsMotion(PhilipsMotionParams {
            device: "kitchen_motion".to_string(),
            active: true,
        }));
        let event = StreamEvent::new(
            "hue",
            Some("kitchen_motion".to_string()),
            StreamKind::DeviceChanged,
        );
        assert!(!cond.matches(&event));
    }

    #[test]
    fn should_default_active_true_when_deserializing() {
        let value = serde_json::json!({
            "driver": "philips_motion",
            "params": {"device": "kitchen_motion"}
        });
        let cond: OccurCond = serde_json::from_value(value).unwrap();
        let OccurKind::PhilipsMotion(params) = cond.kind else {
            panic!("wrong driver");
        };
        assert!(params.active);
    }

    #[test]
    fn should_reject_unknown_param_keys() {
        let value = serde_json::json!({
            "driver": "philips_contact",
            "params": {"device": "front_door", "bogus": true}
        });
        let result: Result<OccurCond, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }
}
