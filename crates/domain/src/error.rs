//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`LumaError`]
//! via `#[from]` (or an explicit `From` impl for boxed sources). No layer
//! returns bare strings.

use thiserror::Error;

/// Top-level error for the luma workspace.
#[derive(Debug, Error)]
pub enum LumaError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A named child or record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The persistence layer failed. The boxed source is the storage
    /// adapter's own typed error.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A vendor origin failed to fetch state or perform an action.
    #[error("origin error")]
    Origin(#[from] OriginError),
}

/// Violated domain invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A child was declared without a name.
    #[error("name must not be empty")]
    EmptyName,

    /// A desire or aspire targets no groups.
    #[error("rule must target at least one group")]
    NoGroups,

    /// A desire or aspire must set exactly one of `scene` / `stage`.
    #[error("exactly one of scene or stage must be set")]
    AmbiguousTarget,

    /// Brightness is a percentage.
    #[error("level must be at most 100, got {0}")]
    LevelOutOfRange(u8),

    /// Color temperature is restricted to the mired range vendors accept.
    #[error("color temperature must be within 153..=500 mireds, got {0}")]
    ColorTempOutOfRange(u16),

    /// A period bound was not `HH:MM`.
    #[error("invalid time of day: {0}")]
    InvalidTimeOfDay(String),

    /// A light state string was neither `on` nor `off`.
    #[error("invalid light state: {0}")]
    InvalidLightState(String),

    /// A regexp condition carried an uncompilable pattern.
    #[error("invalid regular expression: {0}")]
    InvalidPattern(String),

    /// A store condition operator needs a comparison value.
    #[error("operator {operator} requires a value")]
    MissingValue { operator: &'static str },

    /// A condition was declared without anything to match.
    #[error("condition for {driver} must list at least one target")]
    EmptyCondition { driver: &'static str },

    /// Two children of the same kind share a name.
    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    /// A child references a name that was never declared.
    #[error("{kind} {name} references unknown {target_kind}: {target}")]
    UnknownReference {
        kind: &'static str,
        name: String,
        target_kind: &'static str,
        target: String,
    },
}

/// A lookup by name or key found nothing.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Kind of thing looked up (`"device"`, `"group"`, …).
    pub entity: &'static str,
    /// The name or key that missed.
    pub id: String,
}

/// A vendor origin operation failed.
#[derive(Debug, Error)]
#[error("origin {origin} failed")]
pub struct OriginError {
    /// Configured origin name.
    pub origin: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl OriginError {
    /// Wrap an adapter-specific error with the origin's name.
    pub fn new(
        origin: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            origin: origin.into(),
            source: Box::new(source),
        }
    }
}
