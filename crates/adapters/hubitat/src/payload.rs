//! Maker API payloads.
//!
//! `/devices/all` returns one entry per device with its attributes as a
//! list of name/value pairs. Values come back as strings or numbers
//! depending on the driver, so the helpers normalise both forms.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use luma_domain::stage::{LightState, Stage};
use luma_domain::stream::ContactState;
use luma_domain::time::Timestamp;

#[derive(Debug, Deserialize)]
pub struct DeviceEntry {
    #[serde(deserialize_with = "de_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AttributeEntry {
    pub name: String,
    #[serde(default, rename = "currentValue")]
    pub current_value: serde_json::Value,
}

fn de_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

impl DeviceEntry {
    fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| &attribute.current_value)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(serde_json::Value::as_str)
    }

    fn number(&self, name: &str) -> Option<f64> {
        match self.attribute(name)? {
            serde_json::Value::Number(number) => number.as_f64(),
            serde_json::Value::String(text) => text.parse().ok(),
            _ => None,
        }
    }

    /// Display label, the driver name when none is set.
    #[must_use]
    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Last activity instant. Hubs report it in RFC 3339 or with a
    /// colon-less offset depending on firmware.
    #[must_use]
    pub fn changed(&self) -> Option<Timestamp> {
        let raw = self.date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc))
    }

    #[must_use]
    pub fn motion(&self) -> Option<bool> {
        match self.text("motion") {
            Some("active") => Some(true),
            Some("inactive") => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn contact(&self) -> Option<ContactState> {
        match self.text("contact") {
            Some("open") => Some(ContactState::Open),
            Some("closed") => Some(ContactState::Closed),
            _ => None,
        }
    }

    #[must_use]
    pub fn battery(&self) -> Option<u8> {
        self.number("battery")
            .map(|value| value.round().clamp(0.0, 100.0) as u8)
    }

    /// Whether the device accepts `on`/`off` commands.
    #[must_use]
    pub fn switchable(&self) -> bool {
        self.attribute("switch").is_some()
    }

    /// Current light stage of a switchable device.
    #[must_use]
    pub fn stage(&self) -> Stage {
        Stage {
            state: match self.text("switch") {
                Some("on") => Some(LightState::On),
                Some("off") => Some(LightState::Off),
                _ => None,
            },
            level: self
                .number("level")
                .map(|value| value.round().clamp(0.0, 100.0) as u8),
            color_temp: self.number("colorTemperature").and_then(kelvin_to_mired),
        }
    }
}

/// Hubitat reports color temperature in kelvin, stages carry mireds.
fn kelvin_to_mired(kelvin: f64) -> Option<u16> {
    if kelvin <= 0.0 {
        return None;
    }
    u16::try_from((1_000_000.0 / kelvin).round() as i64).ok()
}

/// Mired stage value back to the kelvin the Maker API expects.
#[must_use]
pub fn mired_to_kelvin(mired: u16) -> u32 {
    1_000_000 / u32::from(mired.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dimmer() -> DeviceEntry {
        serde_json::from_value(serde_json::json!({
            "id": 34,
            "name": "Generic Zigbee Bulb",
            "label": "Desk lamp",
            "date": "2024-03-05T12:00:00+0000",
            "attributes": [
                {"name": "switch", "currentValue": "on"},
                {"name": "level", "currentValue": "75"},
                {"name": "colorTemperature", "currentValue": 2732}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn should_accept_numeric_ids() {
        assert_eq!(dimmer().id, "34");
    }

    #[test]
    fn should_build_stage_from_attributes() {
        let stage = dimmer().stage();
        assert_eq!(stage.state, Some(LightState::On));
        assert_eq!(stage.level, Some(75));
        assert_eq!(stage.color_temp, Some(366));
    }

    #[test]
    fn should_parse_colonless_offset_dates() {
        assert!(dimmer().changed().is_some());
    }

    #[test]
    fn should_map_sensor_attributes() {
        let sensor: DeviceEntry = serde_json::from_value(serde_json::json!({
            "id": "7",
            "name": "Hall sensor",
            "attributes": [
                {"name": "motion", "currentValue": "active"},
                {"name": "contact", "currentValue": "open"},
                {"name": "battery", "currentValue": 62}
            ]
        }))
        .unwrap();
        assert_eq!(sensor.motion(), Some(true));
        assert_eq!(sensor.contact(), Some(ContactState::Open));
        assert_eq!(sensor.battery(), Some(62));
        assert!(!sensor.switchable());
        assert_eq!(sensor.display(), "Hall sensor");
    }

    #[test]
    fn should_convert_between_kelvin_and_mired() {
        assert_eq!(kelvin_to_mired(2700.0), Some(370));
        assert_eq!(mired_to_kelvin(370), 2702);
        assert_eq!(kelvin_to_mired(0.0), None);
    }
}
