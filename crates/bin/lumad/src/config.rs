//! Configuration loading: one TOML file with environment overrides.
//!
//! Looks for `luma.toml` in the working directory (or the path given in
//! `LUMA_CONFIG`). Service and database settings all have defaults, so a
//! minimal file only declares origins and children. Environment variables
//! take precedence over file values.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use luma_adapter_hubitat::MakerConfig;
use luma_adapter_philips::BridgeConfig;
use luma_adapter_ubiquiti::ControllerConfig;
use luma_app::children::Children;
use luma_app::service::ServiceOptions;
use luma_domain::aspire::Aspire;
use luma_domain::desire::Desire;
use luma_domain::device::Device;
use luma_domain::error::LumaError;
use luma_domain::group::Group;
use luma_domain::scene::Scene;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Vendor connections, keyed by origin name.
    pub origins: BTreeMap<String, OriginConfig>,
    pub devices: Vec<Device>,
    pub groups: Vec<Group>,
    pub scenes: Vec<Scene>,
    pub desires: Vec<Desire>,
    pub aspires: Vec<Aspire>,
}

/// Service loop settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Resolve actions but never call the vendor.
    pub dryrun: bool,
    /// When false, engines run but planned actions are discarded.
    pub potent: bool,
    /// Seconds between origin polls.
    pub refresh_secs: u64,
    /// Seconds between desire evaluations.
    pub tick_secs: u64,
    /// Capacity of each bounded work queue.
    pub queue_capacity: usize,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// One vendor connection, discriminated by `kind`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OriginConfig {
    Philips(BridgeConfig),
    Hubitat(MakerConfig),
    Ubiquiti(ControllerConfig),
}

impl Config {
    /// Load configuration from `luma.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// setting fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("LUMA_CONFIG").unwrap_or_else(|_| "luma.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LUMA_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("LUMA_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("LUMA_DRYRUN") {
            if let Ok(flag) = val.parse() {
                self.service.dryrun = flag;
            }
        }
        if let Ok(val) = std::env::var("LUMA_POTENT") {
            if let Ok(flag) = val.parse() {
                self.service.potent = flag;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.service.refresh_secs == 0 {
            return Err(ConfigError::Validation(
                "service.refresh_secs must be non-zero".to_string(),
            ));
        }
        if self.service.tick_secs == 0 {
            return Err(ConfigError::Validation(
                "service.tick_secs must be non-zero".to_string(),
            ));
        }
        if self.service.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "service.queue_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the validated children registry from the declared sections.
    ///
    /// # Errors
    ///
    /// Returns [`LumaError::Validation`] on duplicate names, invalid
    /// children, or dangling references.
    pub fn children(&self) -> Result<Children, LumaError> {
        Children::new(
            self.origins.keys().cloned().collect(),
            self.devices.clone(),
            self.groups.clone(),
            self.scenes.clone(),
            self.desires.clone(),
            self.aspires.clone(),
        )
    }
}

impl ServiceConfig {
    /// Convert into the runtime options the service understands.
    #[must_use]
    pub fn options(&self) -> ServiceOptions {
        ServiceOptions {
            dryrun: self.dryrun,
            potent: self.potent,
            refresh_interval: Duration::from_secs(self.refresh_secs),
            tick_interval: Duration::from_secs(self.tick_secs),
            queue_capacity: self.queue_capacity,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            dryrun: false,
            potent: true,
            refresh_secs: 30,
            tick_secs: 10,
            queue_capacity: 64,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:luma.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "lumad=info,luma=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert!(!config.service.dryrun);
        assert!(config.service.potent);
        assert_eq!(config.service.refresh_secs, 30);
        assert_eq!(config.service.tick_secs, 10);
        assert_eq!(config.database.url, "sqlite:luma.db?mode=rwc");
        assert!(config.origins.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.service.queue_capacity, 64);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r#"
            [service]
            dryrun = true
            potent = false
            refresh_secs = 5
            tick_secs = 2
            queue_capacity = 16

            [database]
            url = "sqlite:test.db"

            [logging]
            filter = "debug"

            [origins.hue]
            kind = "philips"
            host = "bridge.local"
            token = "app-key"

            [origins.hub]
            kind = "hubitat"
            host = "hub.local"
            app_id = "12"
            token = "secret"

            [origins.net]
            kind = "ubiquiti"
            host = "unifi.local"
            username = "viewer"
            password = "secret"

            [[devices]]
            name = "kitchen_motion"
            origin = "hue"
            unique = "dev-1"

            [[groups]]
            name = "kitchen"
            origin = "hue"
            unique = "room-1"

            [[scenes]]
            name = "bright"

            [[desires]]
            name = "evening"
            groups = ["kitchen"]
            scene = "bright"

            [[aspires]]
            name = "kitchen_on_motion"
            groups = ["kitchen"]
            scene = "bright"

            [[aspires.occurs]]
            driver = "philips_motion"

            [aspires.occurs.params]
            device = "kitchen_motion"
            active = true
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.service.dryrun);
        assert_eq!(config.origins.len(), 3);
        assert!(matches!(
            config.origins["hue"],
            OriginConfig::Philips(ref bridge) if bridge.host == "bridge.local"
        ));
        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.aspires[0].occurs.len(), 1);

        let children = config.children().unwrap();
        assert!(children.device("kitchen_motion").is_ok());
        assert_eq!(children.aspires().count(), 1);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.service.refresh_secs, 30);
    }

    #[test]
    fn should_reject_zero_intervals() {
        let mut config = Config::default();
        config.service.tick_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_children_with_dangling_references() {
        let toml = r#"
            [[devices]]
            name = "ghost"
            origin = "hue"
            unique = "dev-1"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.children().is_err());
    }

    #[test]
    fn should_convert_service_section_into_options() {
        let section = ServiceConfig {
            refresh_secs: 5,
            ..ServiceConfig::default()
        };
        let options = section.options();
        assert_eq!(options.refresh_interval, Duration::from_secs(5));
        assert!(options.potent);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
