//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `evesim.toml` in the working directory, or at the path given in
//! `EVESIM_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::num::NonZeroUsize;

use evesim_adapter_host_memory::DEFAULT_LOG_CAPACITY;
use evesim_app::config::PlatformConfig;
use evesim_domain::device::DeviceKind;
use evesim_domain::version::{HostVersion, MINIMUM_HOST_VERSION};
use serde::Deserialize;

const DEFAULT_PATH: &str = "evesim.toml";

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emulated host settings.
    pub host: HostConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// One entry per emulated accessory.
    #[serde(rename = "accessory")]
    pub accessories: Vec<AccessoryConfig>,
}

/// In-memory host configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Version reported by the host to the version gate.
    pub version: String,
    /// Minimum host version required by the accessories.
    pub minimum_version: String,
    /// Entries kept in the host's attribute-write and event logs.
    pub log_capacity: NonZeroUsize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// One emulated accessory.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessoryConfig {
    pub kind: DeviceKind,
    #[serde(flatten)]
    pub platform: PlatformConfig,
}

impl AccessoryConfig {
    fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            platform: PlatformConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `evesim.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("EVESIM_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
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
        if let Ok(val) = std::env::var("EVESIM_HOST_VERSION") {
            self.host.version = val;
        }
        if let Ok(val) = std::env::var("EVESIM_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("host.version", &self.host.version),
            ("host.minimum_version", &self.host.minimum_version),
        ] {
            if value.parse::<HostVersion>().is_err() {
                return Err(ConfigError::Validation(format!(
                    "{field} is not a version: {value:?}"
                )));
            }
        }
        if self.accessories.is_empty() {
            return Err(ConfigError::Validation(
                "at least one accessory must be configured".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version: MINIMUM_HOST_VERSION.to_string(),
            minimum_version: MINIMUM_HOST_VERSION.to_string(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "evesimd=info,evesim_app=info,evesim_adapter_host_memory=info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: HostConfig::default(),
            logging: LoggingConfig::default(),
            accessories: vec![
                AccessoryConfig::new(DeviceKind::Motion),
                AccessoryConfig::new(DeviceKind::Door),
            ],
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
        assert_eq!(config.host.version, "3.3.0");
        assert_eq!(config.host.minimum_version, "3.3.0");
        assert_eq!(config.host.log_capacity, DEFAULT_LOG_CAPACITY);
        let kinds: Vec<DeviceKind> = config.accessories.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![DeviceKind::Motion, DeviceKind::Door]);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.accessories.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [host]
            version = '3.4.0'
            minimum_version = '3.3.0'
            log_capacity = 256

            [logging]
            filter = 'debug'

            [[accessory]]
            kind = 'door'
            name = 'Front door'
            unregister_on_shutdown = true
            history_capacity = 64
            seed = 9
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.host.version, "3.4.0");
        assert_eq!(config.host.log_capacity.get(), 256);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.accessories.len(), 1);

        let door = &config.accessories[0];
        assert_eq!(door.kind, DeviceKind::Door);
        assert_eq!(door.platform.name, "Front door");
        assert!(door.platform.unregister_on_shutdown);
        assert!(!door.platform.debug);
        assert_eq!(door.platform.history_capacity, NonZeroUsize::new(64));
        assert_eq!(door.platform.seed, 9);
    }

    #[test]
    fn should_default_accessory_fields() {
        let toml = "
            [[accessory]]
            kind = 'motion'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        let motion = &config.accessories[0];
        assert_eq!(motion.platform, PlatformConfig::default());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.accessories.len(), 2);
    }

    #[test]
    fn should_reject_unknown_kind() {
        let toml = "
            [[accessory]]
            kind = 'lamp'
        ";
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_unparseable_host_version() {
        let mut config = Config::default();
        config.host.version = "latest".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_zero_log_capacity() {
        let toml = "
            [host]
            log_capacity = 0
        ";
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_empty_accessory_list() {
        let mut config = Config::default();
        config.accessories.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
