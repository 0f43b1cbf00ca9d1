//! Persistence records: the key/value table behind `store` conditions.
//!
//! Values are deliberately restricted to JSON-serializable scalars so the
//! table stays a plain lookup surface for rules, never a document store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// A scalar value stored under a persistence key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PersistValue {
    /// The string form, when the value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PersistValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => v.fmt(f),
            Self::Int(v) => v.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<bool> for PersistValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PersistValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PersistValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PersistValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// One row of the persistence table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistRecord {
    /// Unique key.
    pub unique: String,
    /// Stored scalar.
    pub value: PersistValue,
    /// When set, the record stops existing at this instant.
    pub expire: Option<Timestamp>,
    /// Free-form operator note.
    pub about: Option<String>,
    /// Last write time.
    pub updated: Timestamp,
}

impl PersistRecord {
    /// Create a record without expiry, stamped now.
    #[must_use]
    pub fn new(unique: impl Into<String>, value: impl Into<PersistValue>) -> Self {
        Self {
            unique: unique.into(),
            value: value.into(),
            expire: None,
            about: None,
            updated: crate::time::now(),
        }
    }

    /// Attach an expiry instant.
    #[must_use]
    pub fn expiring(mut self, expire: Timestamp) -> Self {
        self.expire = Some(expire);
        self
    }

    /// Whether the record is expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expire.is_some_and(|expire| expire <= now)
    }
}
