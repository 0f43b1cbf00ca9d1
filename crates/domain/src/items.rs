//! Queue payloads exchanged between service workers.
//!
//! Every item carries the origin name it concerns and the instant it was
//! issued, so workers can log and age-out stale work.

use serde::{Deserialize, Serialize};

use crate::snapshot::OriginSnapshot;
use crate::stage::Stage;
use crate::stream::StreamEvent;
use crate::time::Timestamp;

/// What an action drives its group towards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ActionTarget {
    /// Recall a configured scene.
    Scene(String),
    /// Apply a stage directly.
    Stage(Stage),
}

/// Request to drive one group of one origin to a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    /// Configured origin name.
    pub origin: String,
    /// Configured group name.
    pub group: String,
    pub target: ActionTarget,
    /// Rule that produced this action.
    pub source: String,
    pub issued: Timestamp,
}

impl ActionItem {
    /// Create an action stamped now.
    #[must_use]
    pub fn new(
        origin: impl Into<String>,
        group: impl Into<String>,
        target: ActionTarget,
        source: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            group: group.into(),
            target,
            source: source.into(),
            issued: crate::time::now(),
        }
    }
}

/// A freshly merged snapshot for one origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateItem {
    /// Configured origin name.
    pub origin: String,
    pub snapshot: OriginSnapshot,
    pub issued: Timestamp,
}

impl UpdateItem {
    /// Create an update stamped now.
    #[must_use]
    pub fn new(origin: impl Into<String>, snapshot: OriginSnapshot) -> Self {
        Self {
            origin: origin.into(),
            snapshot,
            issued: crate::time::now(),
        }
    }
}

/// One stream event in flight between workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamItem {
    /// Configured origin name.
    pub origin: String,
    pub event: StreamEvent,
    pub issued: Timestamp,
}

impl StreamItem {
    /// Wrap an event, stamped now.
    #[must_use]
    pub fn new(event: StreamEvent) -> Self {
        Self {
            origin: event.origin.clone(),
            issued: crate::time::now(),
            event,
        }
    }
}
