//! Evaluation context shared by the rule engines.
//!
//! The context is a read-only view over everything a where condition may
//! inspect: the persistence table, the latest snapshot per origin, and the
//! children registry. It also owns the clock readings for the tick, so
//! evaluation itself never touches the wall clock.

use std::collections::HashMap;

use luma_domain::persist::PersistValue;
use luma_domain::snapshot::{ClientState, DeviceState, GroupState, OriginSnapshot};
use luma_domain::time::Timestamp;

use crate::children::Children;

/// Read-only view for one evaluation pass.
pub struct WhereContext<'a> {
    /// Instant of this tick.
    pub now: Timestamp,
    /// Same instant in the service's local timezone, for daily windows.
    pub local: chrono::NaiveDateTime,
    /// Live persistence records, keyed by unique.
    pub persist: &'a HashMap<String, PersistValue>,
    /// Latest snapshot per configured origin name.
    pub snapshots: &'a HashMap<String, OriginSnapshot>,
    pub children: &'a Children,
}

/// A configured group resolved into its snapshot state.
pub struct GroupView<'a> {
    /// Configured origin name the group belongs to.
    pub origin: &'a str,
    /// Vendor-unique group id.
    pub unique: &'a str,
    pub state: &'a GroupState,
    /// Snapshot the state came from, for scene lookups.
    pub snapshot: &'a OriginSnapshot,
}

impl<'a> WhereContext<'a> {
    /// Build a context stamped with the current wall clock.
    #[must_use]
    pub fn new(
        persist: &'a HashMap<String, PersistValue>,
        snapshots: &'a HashMap<String, OriginSnapshot>,
        children: &'a Children,
    ) -> Self {
        Self {
            now: luma_domain::time::now(),
            local: chrono::Local::now().naive_local(),
            persist,
            snapshots,
            children,
        }
    }

    /// Resolve a configured device name to its snapshot state.
    ///
    /// Uses the pinned vendor unique when configured, otherwise discovers
    /// it through the vendor label (falling back to the configured name).
    #[must_use]
    pub fn device_state(&self, name: &str) -> Option<&'a DeviceState> {
        let device = self.children.device(name).ok()?;
        let snapshot = self.snapshots.get(&device.origin)?;
        let unique = match &device.unique {
            Some(unique) => unique.as_str(),
            None => snapshot.device_by_label(device.label.as_deref().unwrap_or(&device.name))?,
        };
        snapshot.devices.get(unique)
    }

    /// Resolve a configured device name to a network client state.
    ///
    /// Network clients are declared as devices whose `unique` is the
    /// client identifier (typically a MAC address).
    #[must_use]
    pub fn client_state(&self, name: &str) -> Option<&'a ClientState> {
        let device = self.children.device(name).ok()?;
        let snapshot = self.snapshots.get(&device.origin)?;
        if let Some(unique) = &device.unique {
            return snapshot.clients.get(unique.as_str());
        }
        let label = device.label.as_deref().unwrap_or(&device.name);
        snapshot
            .clients
            .values()
            .find(|client| client.label.as_deref() == Some(label))
    }

    /// Resolve a configured group name to its snapshot view.
    #[must_use]
    pub fn group_view(&self, name: &str) -> Option<GroupView<'a>> {
        let group = self.children.group(name).ok()?;
        let snapshot = self.snapshots.get(&group.origin)?;
        let unique = match &group.unique {
            Some(unique) => unique.as_str(),
            None => snapshot.group_by_label(group.label.as_deref().unwrap_or(&group.name))?,
        };
        let state = snapshot.groups.get(unique)?;
        Some(GroupView {
            origin: &group.origin,
            unique,
            state,
            snapshot,
        })
    }
}
