//! Configuration loading and typed config structures for the Daylight cycle.
//!
//! The configuration lives in `daylight-config.yaml` in the working
//! directory. Every field has a default equal to the values the cycle was
//! tuned with, so the file is optional and may be partial.
//!
//! Environment variables override the simulator address:
//! - `SIMULATOR_HOST` overrides `simulator.host`
//! - `SIMULATOR_PORT` overrides `simulator.port`
//! - `SIMULATOR_BACKEND` overrides `simulator.backend`

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use daylight_types::{Location, Rotation};
use serde::Deserialize;
use tracing::warn;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "daylight-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file.
    File(PathBuf),
    /// No file was present; built-in defaults were used.
    Defaults,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DaylightConfig {
    /// How to reach the simulator.
    #[serde(default)]
    pub simulator: SimulatorConfig,

    /// Cycle loop pacing and bounds.
    #[serde(default)]
    pub cycle: CycleConfig,

    /// Initial spectator camera placement.
    #[serde(default)]
    pub spectator: SpectatorConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DaylightConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.simulator.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    ///
    /// Environment overrides apply in both cases.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be loaded.
    pub fn load_or_default(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        if path.exists() {
            let config = Self::from_file(path)?;
            Ok((config, ConfigSource::File(path.to_path_buf())))
        } else {
            let mut config = Self::default();
            config.simulator.apply_env_overrides();
            config.validate()?;
            Ok((config, ConfigSource::Defaults))
        }
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulator.port == 0 {
            return Err(ConfigError::Invalid {
                reason: "simulator.port must be non-zero".to_owned(),
            });
        }
        if self.simulator.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "simulator.connect_timeout_ms must be at least 1".to_owned(),
            });
        }
        if !self.simulator.headless_delta_seconds.is_finite()
            || self.simulator.headless_delta_seconds <= 0.0
        {
            return Err(ConfigError::Invalid {
                reason: "simulator.headless_delta_seconds must be a positive number".to_owned(),
            });
        }
        if !self.cycle.start_hour.is_finite() {
            return Err(ConfigError::Invalid {
                reason: "cycle.start_hour must be a finite number".to_owned(),
            });
        }
        Ok(())
    }
}

/// Which simulator implementation to drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatorBackend {
    /// A running simulator reached over TCP.
    #[default]
    Bridge,
    /// The in-process [`HeadlessWorld`](crate::simulator::HeadlessWorld).
    Headless,
}

impl FromStr for SimulatorBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bridge" => Ok(Self::Bridge),
            "headless" => Ok(Self::Headless),
            other => Err(ConfigError::Invalid {
                reason: format!("unknown simulator backend: {other}"),
            }),
        }
    }
}

/// Simulator connection settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulatorConfig {
    /// Which simulator implementation to drive.
    #[serde(default)]
    pub backend: SimulatorBackend,

    /// Simulator host name.
    #[serde(default = "default_host")]
    pub host: String,

    /// Simulator port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout for connecting and for every request, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Simulated seconds per frame for the headless backend.
    #[serde(default = "default_headless_delta_seconds")]
    pub headless_delta_seconds: f64,
}

impl SimulatorConfig {
    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Values that do not parse are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SIMULATOR_HOST") {
            self.host = val;
        }
        if let Some(val) = lookup("SIMULATOR_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(e) => warn!(value = %val, error = %e, "ignoring invalid SIMULATOR_PORT"),
            }
        }
        if let Some(val) = lookup("SIMULATOR_BACKEND") {
            match val.parse::<SimulatorBackend>() {
                Ok(backend) => self.backend = backend,
                Err(e) => warn!(value = %val, error = %e, "ignoring invalid SIMULATOR_BACKEND"),
            }
        }
    }

    /// Return the `host:port` address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Return the connect and request timeout.
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            backend: SimulatorBackend::default(),
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            headless_delta_seconds: default_headless_delta_seconds(),
        }
    }
}

/// Cycle loop settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CycleConfig {
    /// Pause between loop iterations in milliseconds (0 = no pause).
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    /// Simulated hour the clock starts at.
    #[serde(default)]
    pub start_hour: f64,

    /// Stop after this many ticks (0 = run until interrupted).
    #[serde(default)]
    pub max_ticks: u64,
}

impl CycleConfig {
    /// Return the pause between loop iterations.
    pub const fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval_ms(),
            start_hour: 0.0,
            max_ticks: 0,
        }
    }
}

/// Initial spectator camera placement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpectatorConfig {
    /// Whether to move the spectator at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Camera x in meters.
    #[serde(default)]
    pub x: f64,

    /// Camera y in meters.
    #[serde(default)]
    pub y: f64,

    /// Camera height in meters.
    #[serde(default = "default_spectator_z")]
    pub z: f64,

    /// Camera pitch in degrees; negative looks down.
    #[serde(default = "default_spectator_pitch")]
    pub pitch: f64,

    /// Camera yaw in degrees.
    #[serde(default)]
    pub yaw: f64,

    /// Camera roll in degrees.
    #[serde(default)]
    pub roll: f64,
}

impl SpectatorConfig {
    /// Return the configured camera location.
    pub const fn location(&self) -> Location {
        Location::new(self.x, self.y, self.z)
    }

    /// Return the configured camera rotation.
    pub const fn rotation(&self) -> Rotation {
        Rotation::new(self.pitch, self.yaw, self.roll)
    }
}

impl Default for SpectatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            x: 0.0,
            y: 0.0,
            z: default_spectator_z(),
            pitch: default_spectator_pitch(),
            yaw: 0.0,
            roll: 0.0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "localhost".to_owned()
}

const fn default_port() -> u16 {
    2000
}

const fn default_connect_timeout_ms() -> u64 {
    15_000
}

const fn default_headless_delta_seconds() -> f64 {
    0.05
}

const fn default_update_interval_ms() -> u64 {
    100
}

const fn default_spectator_z() -> f64 {
    50.0
}

const fn default_spectator_pitch() -> f64 {
    -60.0
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn parse_without_env(yaml: &str) -> DaylightConfig {
        let config: DaylightConfig = serde_yml::from_str(yaml).unwrap();
        config.validate().unwrap();
        config
    }

    #[test]
    fn default_config_matches_tuned_values() {
        let config = DaylightConfig::default();
        assert_eq!(config.simulator.backend, SimulatorBackend::Bridge);
        assert_eq!(config.simulator.host, "localhost");
        assert_eq!(config.simulator.port, 2000);
        assert_eq!(config.simulator.timeout(), Duration::from_secs(15));
        assert_eq!(config.cycle.update_interval(), Duration::from_millis(100));
        assert_eq!(config.cycle.start_hour, 0.0);
        assert_eq!(config.cycle.max_ticks, 0);
        assert!(config.spectator.enabled);
        assert_eq!(config.spectator.location(), Location::new(0.0, 0.0, 50.0));
        assert_eq!(config.spectator.rotation(), Rotation::new(-60.0, 0.0, 0.0));
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
simulator:
  backend: headless
  host: "sim.local"
  port: 3000
  connect_timeout_ms: 5000
  headless_delta_seconds: 0.1
cycle:
  update_interval_ms: 0
  start_hour: 5.5
  max_ticks: 100
spectator:
  enabled: false
  x: 10.0
  y: -4.0
  z: 80.0
  pitch: -45.0
  yaw: 90.0
  roll: 0.0
logging:
  level: "debug"
"#;
        let config = parse_without_env(yaml);
        assert_eq!(config.simulator.backend, SimulatorBackend::Headless);
        assert_eq!(config.simulator.address(), "sim.local:3000");
        assert_eq!(config.simulator.headless_delta_seconds, 0.1);
        assert_eq!(config.cycle.update_interval_ms, 0);
        assert_eq!(config.cycle.start_hour, 5.5);
        assert_eq!(config.cycle.max_ticks, 100);
        assert!(!config.spectator.enabled);
        assert_eq!(config.spectator.rotation(), Rotation::new(-45.0, 90.0, 0.0));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = parse_without_env("simulator:\n  port: 2010\n");
        assert_eq!(config.simulator.port, 2010);
        // Everything else uses defaults
        assert_eq!(config.simulator.host, "localhost");
        assert_eq!(config.spectator.z, 50.0);
    }

    #[test]
    fn parse_empty_yaml() {
        let config: Result<DaylightConfig, _> = serde_yml::from_str("");
        assert!(config.is_ok());
    }

    #[test]
    fn zero_port_is_rejected() {
        let config: DaylightConfig = serde_yml::from_str("simulator:\n  port: 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn non_positive_headless_delta_is_rejected() {
        let config: DaylightConfig =
            serde_yml::from_str("simulator:\n  headless_delta_seconds: 0.0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_backend_fails_to_parse() {
        let result: Result<DaylightConfig, _> = serde_yml::from_str("simulator:\n  backend: carla\n");
        assert!(result.is_err());
        assert!("carla".parse::<SimulatorBackend>().is_err());
        assert_eq!(" Headless ".parse::<SimulatorBackend>().unwrap(), SimulatorBackend::Headless);
    }

    #[test]
    fn overrides_replace_simulator_address() {
        let vars: BTreeMap<&str, &str> = [
            ("SIMULATOR_HOST", "10.0.0.7"),
            ("SIMULATOR_PORT", "2002"),
            ("SIMULATOR_BACKEND", "headless"),
        ]
        .into_iter()
        .collect();

        let mut sim = SimulatorConfig::default();
        sim.apply_overrides(|key| vars.get(key).map(|v| (*v).to_owned()));
        assert_eq!(sim.address(), "10.0.0.7:2002");
        assert_eq!(sim.backend, SimulatorBackend::Headless);
    }

    #[test]
    fn invalid_override_is_ignored() {
        let mut sim = SimulatorConfig::default();
        sim.apply_overrides(|key| (key == "SIMULATOR_PORT").then(|| "not-a-port".to_owned()));
        assert_eq!(sim.port, 2000);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("no-such-daylight-config.yaml");
        let (_config, source) = DaylightConfig::load_or_default(&path).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            let config = DaylightConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
