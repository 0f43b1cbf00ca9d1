//! Where conditions: the drivers a desire (or an aspire's gate) is built
//! from.
//!
//! Each driver carries its own closed params struct: unknown keys are a
//! config error, caught at load time rather than silently ignored. The
//! `family` key groups conditions for evaluation; conditions inside one
//! family are ANDed, families are ORed against each other.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::persist::PersistValue;

fn default_family() -> String {
    "default".to_string()
}

/// One configured where condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereCond {
    /// Evaluation group; conditions sharing a family are ANDed.
    #[serde(default = "default_family")]
    pub family: String,
    #[serde(flatten)]
    pub kind: WhereKind,
}

impl WhereCond {
    /// Wrap a driver in the `default` family.
    #[must_use]
    pub fn new(kind: WhereKind) -> Self {
        Self {
            family: default_family(),
            kind,
        }
    }

    /// Wrap a driver in a named family.
    #[must_use]
    pub fn in_family(kind: WhereKind, family: impl Into<String>) -> Self {
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
}

/// The family-specific where drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "driver", content = "params", rename_all = "snake_case")]
pub enum WhereKind {
    /// Test a key in the persistence table.
    Store(StoreParams),
    /// Test the wall clock against a daily window.
    Period(PeriodParams),
    /// Match a regular expression against a stored string value.
    Regexp(RegexpParams),
    /// True when listed devices have been idle long enough.
    PhilipsChange(PhilipsChangeParams),
    /// True when a group's active scene is one of those listed.
    PhilipsScene(PhilipsSceneParams),
    /// True when a listed network client was seen recently.
    UbiquitiClient(UbiquitiClientParams),
}

impl WhereKind {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Store(params) => params.validate(),
            Self::Period(params) => params.validate(),
            Self::Regexp(params) => params.validate(),
            Self::PhilipsChange(params) => params.validate(),
            Self::PhilipsScene(params) => params.validate(),
            Self::UbiquitiClient(params) => params.validate(),
        }
    }
}

/// How a `store` condition compares the stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOperator {
    /// Key exists (and is not expired).
    #[default]
    Present,
    /// Key does not exist.
    Absent,
    /// Key exists and equals `value`.
    Eq,
    /// Key is absent or differs from `value`.
    Ne,
}

/// Params for the `store` driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreParams {
    /// Persistence key to inspect.
    pub unique: String,
    #[serde(default)]
    pub operator: StoreOperator,
    /// Comparison value for `eq` / `ne`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<PersistValue>,
}

impl StoreParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.unique.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        match self.operator {
            StoreOperator::Eq | StoreOperator::Ne if self.value.is_none() => {
                Err(ValidationError::MissingValue {
                    operator: match self.operator {
                        StoreOperator::Eq => "eq",
                        _ => "ne",
                    },
                })
            }
            _ => Ok(()),
        }
    }
}

/// Days of the week a period may be limited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Mon,
            chrono::Weekday::Tue => Self::Tue,
            chrono::Weekday::Wed => Self::Wed,
            chrono::Weekday::Thu => Self::Thu,
            chrono::Weekday::Fri => Self::Fri,
            chrono::Weekday::Sat => Self::Sat,
            chrono::Weekday::Sun => Self::Sun,
        }
    }
}

/// Params for the `period` driver. Bounds are `HH:MM`; a `stop` before
/// `start` wraps past midnight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeriodParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
    /// Restrict to these weekdays; unset means every day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<DayOfWeek>>,
}

impl PeriodParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.start.is_none() && self.stop.is_none() && self.days.is_none() {
            return Err(ValidationError::EmptyCondition { driver: "period" });
        }
        for bound in [&self.start, &self.stop].into_iter().flatten() {
            parse_time_of_day(bound)?;
        }
        Ok(())
    }
}

/// Parse an `HH:MM` bound.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimeOfDay`] for anything else.
pub fn parse_time_of_day(value: &str) -> Result<chrono::NaiveTime, ValidationError> {
    chrono::NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ValidationError::InvalidTimeOfDay(value.to_string()))
}

/// Params for the `regexp` driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegexpParams {
    /// Persistence key whose string value is matched.
    pub unique: String,
    /// Regular expression, `regex` crate syntax.
    pub pattern: String,
}

impl RegexpParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.unique.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        regex::Regex::new(&self.pattern)
            .map(|_| ())
            .map_err(|err| ValidationError::InvalidPattern(err.to_string()))
    }
}

/// Params for the `philips_change` driver: all listed devices idle for at
/// least `since_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhilipsChangeParams {
    /// Configured device names.
    pub devices: Vec<String>,
    pub since_secs: u64,
}

impl PhilipsChangeParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.devices.is_empty() {
            return Err(ValidationError::EmptyCondition {
                driver: "philips_change",
            });
        }
        Ok(())
    }
}

/// Params for the `philips_scene` driver: the group's active scene is one
/// of the listed scene names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhilipsSceneParams {
    /// Configured group name.
    pub group: String,
    /// Configured scene names.
    pub scenes: Vec<String>,
}

impl PhilipsSceneParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.group.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.scenes.is_empty() {
            return Err(ValidationError::EmptyCondition {
                driver: "philips_scene",
            });
        }
        Ok(())
    }
}

fn default_presence_window() -> u64 {
    300
}

/// Params for the `ubiquiti_client` driver: any listed client seen within
/// the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UbiquitiClientParams {
    /// Configured device names for the network clients.
    pub clients: Vec<String>,
    /// Presence window in seconds.
    #[serde(default = "default_presence_window")]
    pub since_secs: u64,
}

impl UbiquitiClientParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.clients.is_empty() {
            return Err(ValidationError::EmptyCondition {
                driver: "ubiquiti_client",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_family_when_unset() {
        let value = serde_json::json!({
            "driver": "period",
            "params": {"start": "08:00", "stop": "22:00"}
        });
        let cond: WhereCond = serde_json::from_value(value).unwrap();
        assert_eq!(cond.family, "default");
        assert!(matches!(cond.kind, WhereKind::Period(_)));
    }

    #[test]
    fn should_keep_explicit_family() {
        let value = serde_json::json!({
            "family": "evening",
            "driver": "store",
            "params": {"unique": "mode"}
        });
        let cond: WhereCond = serde_json::from_value(value).unwrap();
        assert_eq!(cond.family, "evening");
    }

    #[test]
    fn should_reject_unknown_param_keys() {
        let value = serde_json::json!({
            "driver": "store",
            "params": {"unique": "mode", "bogus": 1}
        });
        let result: Result<WhereCond, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn should_require_value_for_eq_operator() {
        let params = StoreParams {
            unique: "mode".to_string(),
            operator: StoreOperator::Eq,
            value: None,
        };
        assert_eq!(
            params.validate(),
            Err(ValidationError::MissingValue { operator: "eq" })
        );
    }

    #[test]
    fn should_accept_present_operator_without_value() {
        let params = StoreParams {
            unique: "mode".to_string(),
            operator: StoreOperator::Present,
            value: None,
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn should_reject_empty_period() {
        let params = PeriodParams {
            start: None,
            stop: None,
            days: None,
        };
        assert_eq!(
            params.validate(),
            Err(ValidationError::EmptyCondition { driver: "period" })
        );
    }

    #[test]
    fn should_reject_malformed_time_bound() {
        let params = PeriodParams {
            start: Some("25:99".to_string()),
            stop: None,
            days: None,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn should_parse_valid_time_of_day() {
        let time = parse_time_of_day("08:30").unwrap();
        assert_eq!(time, chrono::NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn should_reject_uncompilable_regexp() {
        let params = RegexpParams {
            unique: "mode".to_string(),
            pattern: "(".to_string(),
        };
        assert!(matches!(
            params.validate(),
            Err(ValidationError::InvalidPattern(_))
        ));
    }

    #[test]
    fn should_reject_philips_change_without_devices() {
        let params = PhilipsChangeParams {
            devices: vec![],
            since_secs: 60,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn should_default_presence_window() {
        let value = serde_json::json!({
            "driver": "ubiquiti_client",
            "params": {"clients": ["phone"]}
        });
        let cond: WhereCond = serde_json::from_value(value).unwrap();
        let WhereKind::UbiquitiClient(params) = cond.kind else {
            panic!("wrong driver");
        };
        assert_eq!(params.since_secs, 300);
    }

    #[test]
    fn should_roundtrip_where_cond_through_serde_json() {
        let cond = WhereCond::in_family(
            WhereKind::PhilipsScene(PhilipsSceneParams {
                group: "living_room".to_string(),
                scenes: vec!["relax".to_string()],
            }),
            "evening",
        );
        let json = serde_json::to_string(&cond).unwrap();
        let parsed: WhereCond = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cond);
    }
}
