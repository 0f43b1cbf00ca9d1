//! Latest-snapshot index shared between service tasks.

use std::collections::HashMap;

use luma_domain::items::UpdateItem;
use luma_domain::snapshot::OriginSnapshot;
use luma_domain::stream::StreamEvent;

use crate::children::Children;

/// The latest snapshot per origin, plus the diffing that turns a fresh
/// snapshot into stream events.
#[derive(Debug, Default)]
pub struct StateIndex {
    snapshots: HashMap<String, OriginSnapshot>,
}

impl StateIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest snapshots, keyed by configured origin name.
    #[must_use]
    pub fn snapshots(&self) -> &HashMap<String, OriginSnapshot> {
        &self.snapshots
    }

    /// Install a fresh snapshot, returning the events implied by the move
    /// from the previous one. The first snapshot of an origin produces no
    /// events.
    pub fn apply(&mut self, update: UpdateItem) -> Vec<StreamEvent> {
        let events = self
            .snapshots
            .get(&update.origin)
            .map(|previous| previous.diff(&update.snapshot, &update.origin))
            .unwrap_or_default();
        self.snapshots.insert(update.origin, update.snapshot);
        events
    }

    /// Resolve an event's vendor-unique id to a configured device name.
    ///
    /// Pinned uniques match directly; devices declared by label are
    /// matched through the snapshot's label table.
    #[must_use]
    pub fn resolve_device_name(&self, children: &Children, event: &StreamEvent) -> Option<String> {
        let unique = event.device.as_deref()?;
        for device in children.devices() {
            if device.origin == event.origin && device.unique.as_deref() == Some(unique) {
                return Some(device.name.clone());
            }
        }
        let snapshot = self.snapshots.get(&event.origin)?;
        let label = snapshot.devices.get(unique)?.label.as_deref()?;
        for device in children.devices() {
            if device.origin == event.origin
                && device.unique.is_none()
                && device.label.as_deref().unwrap_or(&device.name) == label
            {
                return Some(device.name.clone());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use luma_domain::device::Device;
    use luma_domain::snapshot::DeviceState;
    use luma_domain::stream::StreamKind;
    use luma_domain::time::now;

    use super::*;

    fn snapshot_with_motion(active: bool) -> OriginSnapshot {
        let mut snapshot = OriginSnapshot::new(now());
        snapshot.devices.insert(
            "dev-1".to_string(),
            DeviceState {
                label: Some("Kitchen motion".to_string()),
                motion: Some(active),
                ..DeviceState::default()
            },
        );
        snapshot
    }

    #[test]
    fn should_produce_no_events_for_first_snapshot() {
        let mut state = StateIndex::new();
        let events = state.apply(UpdateItem::new("hue", snapshot_with_motion(false)));
        assert!(events.is_empty());
        assert!(state.snapshots().contains_key("hue"));
    }

    #[test]
    fn should_diff_against_previous_snapshot() {
        let mut state = StateIndex::new();
        state.apply(UpdateItem::new("hue", snapshot_with_motion(false)));
        let events = state.apply(UpdateItem::new("hue", snapshot_with_motion(true)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, StreamKind::Motion { active: true });
    }

    #[test]
    fn should_resolve_pinned_device_name() {
        let children = Children::new(
            vec!["hue".to_string()],
            vec![Device::new("kitchen_motion", "hue", "dev-1")],
            vec![],
            vec![],
            vec![],
            vec![],
        )
        .unwrap();
        let state = StateIndex::new();
        let event = StreamEvent::new(
            "hue",
            Some("dev-1".to_string()),
            StreamKind::Motion { active: true },
        );
        assert_eq!(
            state.resolve_device_name(&children, &event),
            Some("kitchen_motion".to_string())
        );
    }

    #[test]
    fn should_resolve_device_name_through_label() {
        let children = Children::new(
            vec!["hue".to_string()],
            vec![Device {
                name: "kitchen_motion".to_string(),
                origin: "hue".to_string(),
                unique: None,
                label: Some("Kitchen motion".to_string()),
            }],
            vec![],
            vec![],
            vec![],
            vec![],
        )
        .unwrap();
        let mut state = StateIndex::new();
        state.apply(UpdateItem::new("hue", snapshot_with_motion(true)));
        let event = StreamEvent::new(
            "hue",
            Some("dev-1".to_string()),
            StreamKind::Motion { active: true },
        );
        assert_eq!(
            state.resolve_device_name(&children, &event),
            Some("kitchen_motion".to_string())
        );
    }

    #[test]
    fn should_return_none_for_unknown_device() {
        let children = Children::new(
            vec!["hue".to_string()],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
        )
        .unwrap();
        let state = StateIndex::new();
        let event = StreamEvent::new(
            "hue",
            Some("dev-9".to_string()),
            StreamKind::Motion { active: true },
        );
        assert_eq!(state.resolve_device_name(&children, &event), None);
    }
}
