//! UniFi station payloads.

use serde::Deserialize;

use luma_domain::time::Timestamp;

/// One entry of `stat/sta`, a client currently associated with the network.
#[derive(Debug, Deserialize)]
pub struct StationEntry {
    pub mac: String,
    /// User-assigned alias, when one is set in the controller.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    /// Unix timestamp of the last time the controller saw the client.
    #[serde(default)]
    pub last_seen: Option<i64>,
}

impl StationEntry {
    /// Display label, the alias when set, the hostname otherwise.
    #[must_use]
    pub fn display(&self) -> Option<&str> {
        self.name.as_deref().or(self.hostname.as_deref())
    }

    #[must_use]
    pub fn seen_at(&self) -> Option<Timestamp> {
        chrono::DateTime::from_timestamp(self.last_seen?, 0)
    }
}
